//! Error types for assembly and launch.
//!
//! Every failure is fatal where it is detected. Module errors are folded into
//! [`Error`], and [`Error::kind`] maps each one onto the failure taxonomy the
//! top-level handler reports.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;
use crate::launch::LaunchError;
use crate::manifest::ManifestError;
use crate::util::hash::ContentHash;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Config,
  Integrity,
  MissingSource,
  MissingPatch,
  Download,
  Launch,
  Delta,
  Io,
}

#[derive(Debug, Error)]
pub enum Error {
  /// A manifest resource is malformed.
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  /// A patch list exists but there is no baseline to patch.
  #[error("patches list found without a corresponding download-context")]
  PatchesWithoutRemote,

  /// The working directory cannot be used.
  #[error("refusing to run in '{path}': the path contains '{forbidden}', please rename the affected folder")]
  InvalidWorkingDir { path: PathBuf, forbidden: char },

  /// No entry point was configured and the bundle does not name one.
  #[error("no entry point configured and the bundle has no main-class resource")]
  NoEntryPoint,

  /// Content did not match its expected digest.
  #[error("hash validation failed for {what} {location}: expected {expected}, got {actual}")]
  Integrity {
    what: &'static str,
    location: String,
    expected: ContentHash,
    actual: ContentHash,
  },

  /// A file is neither bundled nor present in the baseline.
  #[error("could not find {path} in the bundle or the baseline archive")]
  MissingSource { path: String },

  /// A file is not bundled and no baseline was provided to fall back on.
  #[error("{path} not found in the bundle, and no baseline archive was provided")]
  MissingSourceNoBaseline { path: String },

  /// A patch payload is not bundled.
  #[error("could not find patch file: {path}")]
  MissingPatch { path: String },

  #[error(transparent)]
  Download(#[from] FetchError),

  #[error(transparent)]
  Launch(#[from] LaunchError),

  /// The delta primitive rejected a patch payload.
  #[error("failed to patch {path}: {source}")]
  Delta {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("i/o error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read archive {path}: {source}")]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Manifest(_)
      | Error::PatchesWithoutRemote
      | Error::InvalidWorkingDir { .. }
      | Error::NoEntryPoint => ErrorKind::Config,
      Error::Integrity { .. } => ErrorKind::Integrity,
      Error::MissingSource { .. } | Error::MissingSourceNoBaseline { .. } => ErrorKind::MissingSource,
      Error::MissingPatch { .. } => ErrorKind::MissingPatch,
      Error::Download(_) => ErrorKind::Download,
      Error::Launch(_) => ErrorKind::Launch,
      Error::Delta { .. } => ErrorKind::Delta,
      Error::Io { .. } | Error::Archive { .. } => ErrorKind::Io,
    }
  }

  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
    Error::Archive {
      path: path.into(),
      source,
    }
  }
}

/// Check `data` against `expected`, naming `what` and `location` on mismatch.
pub(crate) fn ensure_hash(what: &'static str, location: impl Into<String>, data: &[u8], expected: &ContentHash) -> Result<()> {
  let actual = crate::util::hash::hash_bytes(data);
  if actual != *expected {
    return Err(Error::Integrity {
      what,
      location: location.into(),
      expected: *expected,
      actual,
    });
  }
  Ok(())
}
