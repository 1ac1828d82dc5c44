//! clasp: assemble a bundled application, verify it, and launch it.

mod output;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::builder::FalseyValueParser;
use tracing_subscriber::EnvFilter;

use output::OutputFormat;
use run::{RunOptions, cmd_run};

/// Self-verifying installer and launcher for bundled applications
#[derive(Parser)]
#[command(name = "clasp")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Directory holding the download cache and the assembled files
  #[arg(long, env = "CLASP_REPO_DIR", default_value = ".")]
  repo_dir: PathBuf,

  /// Bundle directory or archive (defaults to this executable)
  #[arg(long, env = "CLASP_BUNDLE")]
  bundle: Option<PathBuf>,

  /// Stop after applying patches instead of launching
  #[arg(long, env = "CLASP_PATCH_ONLY", value_parser = FalseyValueParser::new())]
  patch_only: bool,

  /// Entry point symbol, overriding the one named by the bundle
  #[arg(long, env = "CLASP_ENTRY_POINT")]
  entry_point: Option<String>,

  /// Output format for the patch-only summary
  #[arg(long, value_enum, default_value_t)]
  format: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Arguments passed to the application
  #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
  args: Vec<String>,
}

impl From<Cli> for RunOptions {
  fn from(cli: Cli) -> Self {
    RunOptions {
      repo_dir: cli.repo_dir,
      bundle: cli.bundle,
      patch_only: cli.patch_only,
      entry_point: cli.entry_point,
      format: cli.format,
      args: cli.args,
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  // Initialize logging
  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cmd_run(&cli.into()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      output::print_error_chain(&err);
      ExitCode::FAILURE
    }
  }
}
