//! Launching the assembled application.
//!
//! The registry's artifacts form an isolated loading context: dynamic
//! libraries among them are opened with local symbol visibility, so symbol
//! lookups only see the assembled artifacts and never the bootstrap itself.
//! The entry point is resolved by name and run on a dedicated thread.
//!
//! # Entry point contract
//!
//! ```c
//! void entry(int argc, const char *const *argv);
//! ```
//!
//! `argv` holds the forwarded program arguments and is NULL-terminated.

use std::ffi::{CString, c_char, c_int};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use libloading::Library;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::LAUNCH_THREAD_NAME;
use crate::registry::LocationRegistry;

/// Signature every entry point must have.
pub type EntryPoint = unsafe extern "C" fn(argc: c_int, argv: *const *const c_char);

#[derive(Debug, Error)]
pub enum LaunchError {
  /// An artifact looked like a dynamic library but could not be loaded.
  #[error("failed to load '{path}': {source}")]
  Load {
    path: PathBuf,
    #[source]
    source: libloading::Error,
  },

  /// No loaded artifact exports the entry point.
  #[error("entry point '{symbol}' not found in {searched} loaded artifact(s)")]
  NotFound { symbol: String, searched: usize },

  /// The entry point name cannot be a symbol.
  #[error("invalid entry point name {0:?}")]
  InvalidSymbol(String),

  /// A program argument cannot be passed through argv.
  #[error("argument {index} contains a NUL byte")]
  InvalidArgument { index: usize },

  #[error("failed to spawn the application thread: {0}")]
  Spawn(#[source] std::io::Error),
}

/// Whether `path` has the platform's dynamic library extension.
pub fn is_dynamic_library(path: &Path) -> bool {
  path
    .extension()
    .is_some_and(|ext| ext == std::env::consts::DLL_EXTENSION)
}

/// The set of artifacts visible to the launched application.
pub struct LoadContext {
  artifacts: Vec<PathBuf>,
  libraries: Vec<(PathBuf, Library)>,
}

impl LoadContext {
  /// Open every dynamic library among `artifacts`, in order.
  pub fn new(artifacts: Vec<PathBuf>) -> Result<Self, LaunchError> {
    let mut libraries = Vec::new();
    for path in artifacts.iter().filter(|p| is_dynamic_library(p)) {
      // SAFETY: the artifact passed hash validation against the bundle manifest,
      // which is trusted; running its initializers is the point of launching it.
      let library = unsafe { Library::new(path) }.map_err(|source| LaunchError::Load {
        path: path.clone(),
        source,
      })?;
      debug!(path = %path.display(), "loaded artifact");
      libraries.push((path.clone(), library));
    }
    Ok(Self { artifacts, libraries })
  }

  pub fn artifacts(&self) -> &[PathBuf] {
    &self.artifacts
  }

  pub fn loaded(&self) -> impl Iterator<Item = &Path> {
    self.libraries.iter().map(|(path, _)| path.as_path())
  }

  /// Find `symbol` in the first library exporting it.
  ///
  /// The returned pointer is only valid while this context is alive.
  pub fn resolve(&self, symbol: &str) -> Result<EntryPoint, LaunchError> {
    if symbol.is_empty() || symbol.contains('\0') {
      return Err(LaunchError::InvalidSymbol(symbol.to_string()));
    }

    for (path, library) in &self.libraries {
      // SAFETY: the entry point contract fixes the symbol's type.
      if let Ok(entry) = unsafe { library.get::<EntryPoint>(symbol.as_bytes()) } {
        debug!(symbol, path = %path.display(), "resolved entry point");
        return Ok(*entry);
      }
    }

    Err(LaunchError::NotFound {
      symbol: symbol.to_string(),
      searched: self.libraries.len(),
    })
  }
}

/// A running application.
pub struct LaunchHandle {
  handle: JoinHandle<()>,
}

impl LaunchHandle {
  /// Block until the application returns.
  ///
  /// A panic on the application thread is re-raised here.
  pub fn wait(self) {
    if let Err(payload) = self.handle.join() {
      std::panic::resume_unwind(payload);
    }
  }
}

fn to_c_args(args: &[String]) -> Result<Vec<CString>, LaunchError> {
  args
    .iter()
    .enumerate()
    .map(|(index, arg)| CString::new(arg.as_bytes()).map_err(|_| LaunchError::InvalidArgument { index }))
    .collect()
}

/// Load the registry's artifacts and run `symbol` with `args` on its own thread.
pub fn launch(registry: &LocationRegistry, symbol: &str, args: &[String]) -> Result<LaunchHandle, LaunchError> {
  let args = to_c_args(args)?;
  let context = LoadContext::new(registry.artifacts())?;
  let entry = context.resolve(symbol)?;

  info!(symbol, artifacts = context.artifacts().len(), "launching");

  let handle = thread::Builder::new()
    .name(LAUNCH_THREAD_NAME.to_string())
    .spawn(move || {
      let mut argv: Vec<*const c_char> = args.iter().map(|a| a.as_ptr()).collect();
      argv.push(std::ptr::null());
      // SAFETY: `entry` was resolved from a library owned by `context`, which
      // outlives the call; `argv` and the strings it points to outlive it too.
      unsafe { entry(args.len() as c_int, argv.as_ptr()) };
      // Threads the application started may still run code from these
      // libraries, so they stay mapped until the process exits.
      std::mem::forget(context);
    })
    .map_err(LaunchError::Spawn)?;

  Ok(LaunchHandle { handle })
}
