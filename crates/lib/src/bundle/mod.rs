//! Read access to bundles and baseline archives.
//!
//! Both the bundle and the baseline expose their content under `META-INF/`.
//! A [`ResourceSource`] abstracts over where that content lives:
//! - [`DirSource`]: an unpacked directory tree
//! - [`ArchiveSource`]: a zip archive, including one appended to an executable

mod source;

pub use source::*;

use tracing::debug;

use crate::consts::{CATEGORIES, DOWNLOAD_CONTEXT, MAIN_CLASS, PATCHES_LIST, RESOURCE_ROOT};
use crate::error::{Error, Result};
use crate::manifest::{
  BundleManifest, FileEntry, ManifestError, PatchRecord, RemoteDescriptor, parse_entries, parse_patches, parse_remote,
};

/// Path of a category file inside a bundle or baseline archive.
pub fn resource_path(category: &str, path: &str) -> String {
  format!(
    "{}/{}/{}",
    RESOURCE_ROOT,
    category.trim_end_matches('/'),
    path.trim_start_matches('/')
  )
}

/// The distribution bundle the assembler runs from.
pub struct Bundle {
  source: Box<dyn ResourceSource>,
}

impl Bundle {
  /// Open a bundle directory or archive.
  pub fn open(path: &std::path::Path) -> Result<Self> {
    Ok(Self {
      source: open_source(path)?,
    })
  }

  pub fn describe(&self) -> String {
    self.source.describe()
  }

  /// Read `META-INF/<category>/<path>`.
  pub fn read_category_file(&mut self, category: &str, path: &str) -> Result<Option<Vec<u8>>> {
    self.source.read(&resource_path(category, path))
  }

  /// Read a top-level `META-INF/<name>` resource as text.
  fn read_text(&mut self, name: &str) -> Result<Option<String>> {
    let path = format!("{}/{}", RESOURCE_ROOT, name);
    let Some(bytes) = self.source.read(&path)? else {
      return Ok(None);
    };
    let text = String::from_utf8(bytes).map_err(|_| ManifestError::Encoding { resource: path })?;
    Ok(Some(text))
  }

  /// Parse `META-INF/<category>.list`. A missing list has no entries.
  pub fn read_entries(&mut self, category: &str) -> Result<Vec<FileEntry>> {
    let name = format!("{}.list", category);
    match self.read_text(&name)? {
      Some(text) => Ok(parse_entries(&name, &text)?),
      None => {
        debug!(list = %name, "no file-entry list in bundle");
        Ok(Vec::new())
      }
    }
  }

  /// Parse the patch list. A missing list has no patches.
  pub fn read_patches(&mut self) -> Result<Vec<PatchRecord>> {
    match self.read_text(PATCHES_LIST)? {
      Some(text) => Ok(parse_patches(PATCHES_LIST, &text)?),
      None => Ok(Vec::new()),
    }
  }

  /// Parse the remote descriptor, if the bundle has one.
  pub fn read_remote_descriptor(&mut self) -> Result<Option<RemoteDescriptor>> {
    match self.read_text(DOWNLOAD_CONTEXT)? {
      Some(text) => Ok(Some(parse_remote(DOWNLOAD_CONTEXT, &text)?)),
      None => Ok(None),
    }
  }

  /// The default entry point symbol named by the bundle.
  pub fn read_entry_point(&mut self) -> Result<Option<String>> {
    Ok(
      self
        .read_text(MAIN_CLASS)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()),
    )
  }

  /// Read every manifest and check that patches have a baseline to apply to.
  pub fn read_manifest(&mut self) -> Result<BundleManifest> {
    let patches = self.read_patches()?;
    let remote = self.read_remote_descriptor()?;
    if !patches.is_empty() && remote.is_none() {
      return Err(Error::PatchesWithoutRemote);
    }

    let mut entries = Vec::with_capacity(CATEGORIES.len());
    for category in CATEGORIES {
      entries.push((category.to_string(), self.read_entries(category)?));
    }

    Ok(BundleManifest {
      entries,
      patches,
      remote,
    })
  }
}
