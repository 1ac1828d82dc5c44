//! Content hashing for integrity checks.
//!
//! Every artifact the assembler touches is identified by a SHA-256 digest:
//! - `ContentHash`: a parsed, fixed-length digest
//! - `hash_bytes()`: hash arbitrary bytes
//! - `hash_file()`: hash a file by streaming it
//! - `validate_bytes()` / `validate_path()`: the "already satisfied" gates

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of a digest in bytes.
pub const HASH_LEN: usize = 32;

/// A full SHA-256 digest.
///
/// Parsed from hex (either case) and displayed as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; HASH_LEN]);

/// A hex string that is not a valid digest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
  #[error("invalid hex digest '{value}': {reason}")]
  Invalid { value: String, reason: String },

  #[error("digest '{value}' has {actual} bytes, expected 32")]
  Length { value: String, actual: usize },
}

impl ContentHash {
  /// Parse a hex-encoded digest, requiring exactly `HASH_LEN` bytes.
  pub fn from_hex(value: &str) -> Result<Self, HexError> {
    let bytes = hex::decode(value).map_err(|e| HexError::Invalid {
      value: value.to_string(),
      reason: e.to_string(),
    })?;
    let actual = bytes.len();
    let digest: [u8; HASH_LEN] = bytes.try_into().map_err(|_| HexError::Length {
      value: value.to_string(),
      actual,
    })?;
    Ok(ContentHash(digest))
  }

  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.to_hex())
  }
}

impl std::str::FromStr for ContentHash {
  type Err = HexError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ContentHash::from_hex(s)
  }
}

impl Serialize for ContentHash {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_hex())
  }
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hasher.finalize().into())
}

/// Hash a file's contents without loading it into memory.
pub fn hash_file(path: &Path) -> io::Result<ContentHash> {
  let mut file = fs::File::open(path)?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hasher.finalize().into()))
}

/// Check bytes against an expected digest.
pub fn validate_bytes(data: &[u8], expected: &ContentHash) -> bool {
  hash_bytes(data) == *expected
}

/// Check a file against an expected digest.
///
/// A missing file is not an error, it simply does not validate.
pub fn validate_path(path: &Path, expected: &ContentHash) -> io::Result<bool> {
  match hash_file(path) {
    Ok(actual) => Ok(actual == *expected),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e),
  }
}
