//! Parsers for the manifest line formats.
//!
//! Every format is one record per line with TAB-separated fields and an exact
//! field count. Parsers work on text so they can be used without a bundle.

use thiserror::Error;
use url::Url;

use super::types::{FileEntry, PatchRecord, RemoteDescriptor};
use crate::util::hash::{ContentHash, HexError};

const ENTRY_FIELDS: usize = 3;
const PATCH_FIELDS: usize = 7;
const REMOTE_FIELDS: usize = 3;

/// A malformed manifest resource.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// A line does not have the expected number of fields.
  #[error("malformed line {line} in {resource}: expected {expected} fields, found {found}: {content:?}")]
  FieldCount {
    resource: String,
    line: usize,
    expected: usize,
    found: usize,
    content: String,
  },

  /// A hash field is not a valid digest.
  #[error("invalid hash on line {line} in {resource}: {source}")]
  Hash {
    resource: String,
    line: usize,
    #[source]
    source: HexError,
  },

  /// The remote descriptor URL does not parse.
  #[error("invalid URL in {resource}: {url:?}: {source}")]
  Url {
    resource: String,
    url: String,
    #[source]
    source: url::ParseError,
  },

  /// The remote descriptor is empty.
  #[error("{resource} is empty")]
  Empty { resource: String },

  /// A single-line resource has more than one line.
  #[error("unexpected extra content on line {line} in {resource}")]
  ExtraLine { resource: String, line: usize },

  /// A resource is not valid UTF-8.
  #[error("{resource} is not valid UTF-8")]
  Encoding { resource: String },
}

fn split_fields<'a>(
  resource: &str,
  line_no: usize,
  line: &'a str,
  expected: usize,
) -> Result<Vec<&'a str>, ManifestError> {
  let fields: Vec<&str> = line.split('\t').collect();
  if fields.len() != expected {
    return Err(ManifestError::FieldCount {
      resource: resource.to_string(),
      line: line_no,
      expected,
      found: fields.len(),
      content: line.to_string(),
    });
  }
  Ok(fields)
}

fn parse_hash(resource: &str, line_no: usize, value: &str) -> Result<ContentHash, ManifestError> {
  ContentHash::from_hex(value).map_err(|source| ManifestError::Hash {
    resource: resource.to_string(),
    line: line_no,
    source,
  })
}

/// Lines with their 1-based numbers, CR stripped, empty lines dropped.
fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
  text
    .lines()
    .enumerate()
    .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
    .filter(|(_, line)| !line.is_empty())
}

/// Parse a file-entry list: `hash \t id \t path` per line.
pub fn parse_entries(resource: &str, text: &str) -> Result<Vec<FileEntry>, ManifestError> {
  numbered_lines(text)
    .map(|(line_no, line)| -> Result<FileEntry, ManifestError> {
      let fields = split_fields(resource, line_no, line, ENTRY_FIELDS)?;
      Ok(FileEntry {
        hash: parse_hash(resource, line_no, fields[0])?,
        id: fields[1].to_string(),
        path: fields[2].to_string(),
      })
    })
    .collect()
}

/// Parse the patch list.
///
/// Blank lines and lines starting with `#` are comments.
pub fn parse_patches(resource: &str, text: &str) -> Result<Vec<PatchRecord>, ManifestError> {
  numbered_lines(text)
    .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
    .map(|(line_no, line)| -> Result<PatchRecord, ManifestError> {
      let f = split_fields(resource, line_no, line, PATCH_FIELDS)?;
      Ok(PatchRecord {
        category: f[0].to_string(),
        hash_orig: parse_hash(resource, line_no, f[1])?,
        hash_patch: parse_hash(resource, line_no, f[2])?,
        hash_output: parse_hash(resource, line_no, f[3])?,
        path_orig: f[4].to_string(),
        path_patch: f[5].to_string(),
        path_output: f[6].to_string(),
      })
    })
    .collect()
}

/// Parse the single-line remote descriptor: `hash \t url \t cache-name`.
pub fn parse_remote(resource: &str, text: &str) -> Result<RemoteDescriptor, ManifestError> {
  let mut lines = numbered_lines(text);
  let Some((line_no, line)) = lines.next() else {
    return Err(ManifestError::Empty {
      resource: resource.to_string(),
    });
  };
  if let Some((extra, _)) = lines.next() {
    return Err(ManifestError::ExtraLine {
      resource: resource.to_string(),
      line: extra,
    });
  }

  let fields = split_fields(resource, line_no, line, REMOTE_FIELDS)?;
  let url = Url::parse(fields[1]).map_err(|source| ManifestError::Url {
    resource: resource.to_string(),
    url: fields[1].to_string(),
    source,
  })?;

  Ok(RemoteDescriptor {
    hash: parse_hash(resource, line_no, fields[0])?,
    url,
    cache_name: fields[2].to_string(),
  })
}
