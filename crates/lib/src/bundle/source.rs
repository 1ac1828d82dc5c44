//! Resource source backends.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

/// Something resources can be read from by `/`-separated path.
pub trait ResourceSource {
  /// Read a resource, `None` if it does not exist.
  fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>>;

  /// Human-readable location for messages.
  fn describe(&self) -> String;
}

/// Open `path` as a directory source if it is a directory, otherwise as an archive.
pub fn open_source(path: &Path) -> Result<Box<dyn ResourceSource>> {
  if path.is_dir() {
    Ok(Box::new(DirSource::new(path)))
  } else {
    Ok(Box::new(ArchiveSource::open(path)?))
  }
}

/// Resources laid out as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirSource {
  root: PathBuf,
}

impl DirSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl ResourceSource for DirSource {
  fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
    let full = path.split('/').filter(|c| !c.is_empty()).fold(self.root.clone(), |p, c| p.join(c));
    match std::fs::read(&full) {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(Error::io(full, e)),
    }
  }

  fn describe(&self) -> String {
    self.root.display().to_string()
  }
}

/// Resources stored as entries of a zip archive.
pub struct ArchiveSource {
  path: PathBuf,
  archive: ZipArchive<BufReader<File>>,
}

impl ArchiveSource {
  pub fn open(path: &Path) -> Result<Self> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| Error::archive(path, e))?;
    Ok(Self {
      path: path.to_path_buf(),
      archive,
    })
  }
}

impl ResourceSource for ArchiveSource {
  fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match self.archive.by_name(path.trim_start_matches('/')) {
      Ok(entry) => entry,
      Err(ZipError::FileNotFound) => return Ok(None),
      Err(e) => return Err(Error::archive(&self.path, e)),
    };
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
      .read_to_end(&mut bytes)
      .map_err(|e| Error::io(self.path.join(path), e))?;
    Ok(Some(bytes))
  }

  fn describe(&self) -> String {
    self.path.display().to_string()
  }
}
