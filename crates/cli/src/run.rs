//! Assemble the bundle, then launch it or stop after patching.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use clasp_lib::bundle::Bundle;
use clasp_lib::pipeline::{AssembleOptions, Assembly, assemble, check_working_dir};

use crate::output::{self, OutputFormat};

/// Everything the run needs, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct RunOptions {
  pub repo_dir: PathBuf,
  pub bundle: Option<PathBuf>,
  pub patch_only: bool,
  pub entry_point: Option<String>,
  pub format: OutputFormat,
  pub args: Vec<String>,
}

/// Execute the pipeline.
///
/// - Refuses to run from a directory the loader cannot handle
/// - Opens the bundle (this executable unless `--bundle` is given)
/// - Assembles the repository
/// - Stops in patch-only mode, otherwise launches the entry point and waits
///   for the application to finish
pub fn cmd_run(options: &RunOptions) -> Result<()> {
  let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
  check_working_dir(&cwd)?;

  let bundle_path = match &options.bundle {
    Some(path) => path.clone(),
    None => std::env::current_exe().context("Failed to locate the running executable")?,
  };
  debug!(bundle = %bundle_path.display(), "opening bundle");
  let bundle = Bundle::open(&bundle_path).with_context(|| format!("Failed to open bundle {}", bundle_path.display()))?;

  let assemble_options = AssembleOptions {
    repo_root: options.repo_dir.clone(),
    entry_point: options.entry_point.clone(),
  };

  let started = Instant::now();
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;
  let assembly = rt.block_on(assemble(bundle, &assemble_options))?;
  drop(rt);

  if options.patch_only {
    return print_summary(&assembly, options.format, started);
  }

  let app = assembly.launch(&options.args)?;
  drop(assembly);
  app.wait();
  Ok(())
}

fn print_summary(assembly: &Assembly, format: OutputFormat, started: Instant) -> Result<()> {
  if format.is_json() {
    return output::print_json(assembly);
  }

  let report = &assembly.report;
  output::print_success(&format!(
    "Assembly complete in {}",
    output::format_duration(started.elapsed())
  ));
  output::print_stat("Baseline downloaded", if report.downloaded { "yes" } else { "no" });
  output::print_stat("Files extracted", &report.extracted.to_string());
  output::print_stat("Files reused", &report.reused.to_string());
  output::print_stat("Patches applied", &report.patched.to_string());
  output::print_stat("Patches reused", &report.patches_reused.to_string());
  output::print_stat("Artifacts", &assembly.registry.len().to_string());
  Ok(())
}
