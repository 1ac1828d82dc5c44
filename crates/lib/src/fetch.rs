//! Baseline archive download and caching.
//!
//! The baseline lives at `<repo>/cache/<cache-name>` and is reused across
//! runs whenever its content still matches the descriptor's hash.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::consts::CACHE_DIR;
use crate::manifest::RemoteDescriptor;
use crate::util::hash::validate_path;

/// Errors that can occur while resolving the baseline.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Failed to create the cache directory.
  #[error("failed to create cache directory '{0}': {1}")]
  CreateCacheDir(PathBuf, #[source] std::io::Error),

  /// Failed to inspect the cached file.
  #[error("failed to read cached file '{0}': {1}")]
  ReadCache(PathBuf, #[source] std::io::Error),

  /// The request could not be sent or the body could not be read.
  #[error("failed to download {name} from {url}: {source}")]
  Request {
    name: String,
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The server answered with a non-success status.
  #[error("failed to download {name} from {url}: HTTP {status}")]
  Status { name: String, url: String, status: u16 },

  /// Failed to write the downloaded content.
  #[error("failed to write '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Where the baseline described by `descriptor` is cached under `repo_root`.
pub fn cache_path(descriptor: &RemoteDescriptor, repo_root: &Path) -> PathBuf {
  repo_root.join(CACHE_DIR).join(&descriptor.cache_name)
}

/// Outcome of resolving the baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
  pub path: PathBuf,
  /// Whether the network was used.
  pub downloaded: bool,
}

/// Resolve the baseline archive into the cache.
///
/// A cached file that validates against the descriptor hash is returned
/// without touching the network. Otherwise the file is downloaded again.
///
/// The freshly downloaded file is *not* re-validated here: every consumer
/// validates the individual files it reads from the archive.
///
/// The body is streamed into `<cache-name>.part` and renamed into place once
/// complete, so an interrupted download never leaves a truncated cache entry.
pub async fn resolve_remote(descriptor: &RemoteDescriptor, repo_root: &Path) -> Result<Resolved, FetchError> {
  let path = cache_path(descriptor, repo_root);

  if validate_path(&path, &descriptor.hash).map_err(|e| FetchError::ReadCache(path.clone(), e))? {
    debug!(path = %path.display(), "using cached baseline");
    return Ok(Resolved { path, downloaded: false });
  }

  let cache_dir = repo_root.join(CACHE_DIR);
  fs::create_dir_all(&cache_dir)
    .await
    .map_err(|e| FetchError::CreateCacheDir(cache_dir.clone(), e))?;

  match fs::remove_file(&path).await {
    Ok(()) => debug!(path = %path.display(), "removed stale cached baseline"),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
    Err(e) => return Err(FetchError::Write { path, source: e }),
  }

  info!(name = %descriptor.cache_name, "downloading {}", descriptor.cache_name);
  download(descriptor, &path).await?;

  Ok(Resolved { path, downloaded: true })
}

async fn download(descriptor: &RemoteDescriptor, dest: &Path) -> Result<(), FetchError> {
  let name = descriptor.cache_name.clone();
  let url = descriptor.url.to_string();
  let request_error = |source| FetchError::Request {
    name: name.clone(),
    url: url.clone(),
    source,
  };

  let mut response = reqwest::get(descriptor.url.clone()).await.map_err(request_error)?;
  if !response.status().is_success() {
    return Err(FetchError::Status {
      name: name.clone(),
      url: url.clone(),
      status: response.status().as_u16(),
    });
  }

  let part = dest.with_file_name(format!("{}.part", descriptor.cache_name));
  let write_error = |source| FetchError::Write {
    path: part.clone(),
    source,
  };

  let mut file = fs::File::create(&part).await.map_err(write_error)?;
  let mut size = 0usize;
  while let Some(chunk) = response.chunk().await.map_err(request_error)? {
    size += chunk.len();
    file.write_all(&chunk).await.map_err(write_error)?;
  }
  file.flush().await.map_err(write_error)?;
  file.sync_all().await.map_err(write_error)?;
  drop(file);

  fs::rename(&part, dest).await.map_err(|source| FetchError::Write {
    path: dest.to_path_buf(),
    source,
  })?;

  info!(path = %dest.display(), size, "download complete");
  Ok(())
}
