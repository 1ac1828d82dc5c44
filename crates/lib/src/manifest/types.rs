//! Manifest record types.
//!
//! All records are immutable once parsed. Hashes are stored as parsed
//! [`ContentHash`] values, so a record that exists is already known to carry
//! well-formed digests.

use serde::Serialize;
use url::Url;

use crate::util::hash::ContentHash;

/// One required file of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
  /// Expected digest of the materialized file.
  pub hash: ContentHash,
  /// Artifact identifier (e.g. a maven coordinate). Informational only.
  pub id: String,
  /// Path relative to the category directory.
  pub path: String,
}

/// A transformation of one baseline file into one output file.
///
/// The three hashes guard three different stages: the baseline input, the
/// patch payload and the final output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchRecord {
  pub category: String,
  pub hash_orig: ContentHash,
  pub hash_patch: ContentHash,
  pub hash_output: ContentHash,
  pub path_orig: String,
  pub path_patch: String,
  pub path_output: String,
}

impl PatchRecord {
  /// Whether this patch produces `path` within `category`.
  pub fn claims(&self, category: &str, path: &str) -> bool {
    self.category == category && self.path_output == path
  }
}

/// The optional baseline artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteDescriptor {
  pub hash: ContentHash,
  pub url: Url,
  /// File name under the cache directory.
  pub cache_name: String,
}

/// Everything the bundle declares, read once at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundleManifest {
  /// File entries per category, in [`crate::consts::CATEGORIES`] order.
  pub entries: Vec<(String, Vec<FileEntry>)>,
  pub patches: Vec<PatchRecord>,
  pub remote: Option<RemoteDescriptor>,
}

impl BundleManifest {
  pub fn has_patches(&self) -> bool {
    !self.patches.is_empty()
  }
}
