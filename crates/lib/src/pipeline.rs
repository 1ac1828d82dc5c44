//! The assembly pipeline.
//!
//! ```text
//! READ_MANIFESTS -> PREPARE_REPO -> RESOLVE_BASELINE? -> EXTRACT -> APPLY_PATCHES? -> [STOP] -> LAUNCH -> DONE
//! ```
//!
//! Stages run one after another and every failure is fatal. All per-run
//! state lives in an [`AssemblyContext`] passed explicitly to each stage.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::bundle::{ArchiveSource, Bundle};
use crate::consts::FORBIDDEN_PATH_CHARS;
use crate::error::Error;
use crate::extract::materialize;
use crate::fetch::resolve_remote;
use crate::launch::{LaunchHandle, launch};
use crate::manifest::BundleManifest;
use crate::patch::{BsDiff, Delta, apply_patches};
use crate::registry::LocationRegistry;

/// Pipeline stages that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  ReadManifests,
  PrepareRepo,
  ResolveBaseline,
  Extract,
  ApplyPatches,
  Launch,
}

impl Stage {
  fn describe(self) -> &'static str {
    match self {
      Stage::ReadManifests => "read bundle manifests",
      Stage::PrepareRepo => "prepare the repository directory",
      Stage::ResolveBaseline => "download original file",
      Stage::Extract => "extract files",
      Stage::ApplyPatches => "apply patches",
      Stage::Launch => "launch application",
    }
  }
}

/// A fatal failure, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("failed to {}", .stage.describe())]
pub struct AssembleError {
  pub stage: Stage,
  #[source]
  pub source: Error,
}

trait StageExt<T> {
  fn stage(self, stage: Stage) -> Result<T, AssembleError>;
}

impl<T, E: Into<Error>> StageExt<T> for Result<T, E> {
  fn stage(self, stage: Stage) -> Result<T, AssembleError> {
    self.map_err(|e| AssembleError {
      stage,
      source: e.into(),
    })
  }
}

/// Run-level settings.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
  /// Root of the output tree and the cache.
  pub repo_root: PathBuf,
  /// Overrides the bundle's entry point symbol.
  pub entry_point: Option<String>,
}

/// What one run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
  /// Whether the baseline was fetched from the network.
  pub downloaded: bool,
  /// Files copied into the output tree.
  pub extracted: usize,
  /// Files already present with the right content.
  pub reused: usize,
  /// Listed files left to a patch.
  pub claimed_by_patch: usize,
  /// Patches computed and written.
  pub patched: usize,
  /// Patches whose output was already present.
  pub patches_reused: usize,
}

impl AssemblyReport {
  /// Whether the run changed nothing on disk.
  pub fn is_noop(&self) -> bool {
    !self.downloaded && self.extracted == 0 && self.patched == 0
  }
}

/// State threaded through every stage of one run.
pub struct AssemblyContext {
  pub repo_root: PathBuf,
  pub bundle: Bundle,
  pub baseline: Option<ArchiveSource>,
  pub delta: Box<dyn Delta>,
  pub registry: LocationRegistry,
  pub report: AssemblyReport,
  /// Set once the first patch is actually computed.
  pub patches_started: bool,
}

impl AssemblyContext {
  pub fn new(repo_root: PathBuf, bundle: Bundle) -> Self {
    Self {
      repo_root,
      bundle,
      baseline: None,
      delta: Box::new(BsDiff),
      registry: LocationRegistry::new(),
      report: AssemblyReport::default(),
      patches_started: false,
    }
  }

  pub fn with_delta(mut self, delta: impl Delta + 'static) -> Self {
    self.delta = Box::new(delta);
    self
  }

  /// `<repo>/<category>/<path>`.
  pub fn output_path(&self, category: &str, path: &str) -> PathBuf {
    path
      .split('/')
      .filter(|c| !c.is_empty())
      .fold(self.repo_root.join(category.trim_end_matches('/')), |p, c| p.join(c))
  }

  /// Write a verified file, replacing whatever was there.
  pub(crate) fn write_output(&self, path: &Path, bytes: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
  }
}

/// Refuse to run from a directory whose path breaks artifact loading.
pub fn check_working_dir(path: &Path) -> Result<(), Error> {
  let display = path.to_string_lossy();
  match FORBIDDEN_PATH_CHARS.iter().find(|c| display.contains(**c)) {
    Some(forbidden) => Err(Error::InvalidWorkingDir {
      path: path.to_path_buf(),
      forbidden: *forbidden,
    }),
    None => Ok(()),
  }
}

/// The result of a successful assembly.
#[derive(Debug, Clone, Serialize)]
pub struct Assembly {
  pub registry: LocationRegistry,
  pub report: AssemblyReport,
  /// The entry point symbol, if one is configured.
  pub entry_point: Option<String>,
}

impl Assembly {
  /// LAUNCH: start the application on its own worker.
  pub fn launch(&self, args: &[String]) -> Result<LaunchHandle, AssembleError> {
    let entry_point = self.entry_point.as_deref().ok_or(Error::NoEntryPoint).stage(Stage::Launch)?;
    launch(&self.registry, entry_point, args).stage(Stage::Launch)
  }
}

/// Run READ_MANIFESTS through APPLY_PATCHES.
pub async fn assemble(mut bundle: Bundle, options: &AssembleOptions) -> Result<Assembly, AssembleError> {
  let manifest = bundle.read_manifest().stage(Stage::ReadManifests)?;
  let entry_point = match &options.entry_point {
    Some(symbol) => Some(symbol.clone()),
    None => bundle.read_entry_point().stage(Stage::ReadManifests)?,
  };

  let repo_root = absolute_root(&options.repo_root).stage(Stage::PrepareRepo)?;
  let mut ctx = AssemblyContext::new(repo_root, bundle);
  run_stages(&mut ctx, &manifest).await?;

  Ok(Assembly {
    registry: ctx.registry,
    report: ctx.report,
    entry_point,
  })
}

/// Run RESOLVE_BASELINE through APPLY_PATCHES against an existing context.
pub async fn run_stages(ctx: &mut AssemblyContext, manifest: &BundleManifest) -> Result<(), AssembleError> {
  debug!(bundle = %ctx.bundle.describe(), repo = %ctx.repo_root.display(), "assembling");

  if let Some(remote) = &manifest.remote {
    let resolved = resolve_remote(remote, &ctx.repo_root).await.stage(Stage::ResolveBaseline)?;
    ctx.report.downloaded = resolved.downloaded;
    ctx.baseline = Some(ArchiveSource::open(&resolved.path).stage(Stage::ResolveBaseline)?);
  }

  for (category, entries) in &manifest.entries {
    materialize(ctx, category, entries, &manifest.patches).stage(Stage::Extract)?;
  }

  if manifest.has_patches() {
    apply_patches(ctx, &manifest.patches).stage(Stage::ApplyPatches)?;
  }

  info!(
    extracted = ctx.report.extracted,
    reused = ctx.report.reused,
    patched = ctx.report.patched,
    "assembly complete"
  );
  Ok(())
}

fn absolute_root(root: &Path) -> Result<PathBuf, Error> {
  std::fs::create_dir_all(root).map_err(|e| Error::io(root, e))?;
  dunce::canonicalize(root).map_err(|e| Error::io(root, e))
}
