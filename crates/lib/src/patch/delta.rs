//! The binary-delta primitive.

use std::io;

/// Turns a source file and a patch payload into the patched output.
///
/// Implementations must be deterministic.
pub trait Delta {
  fn apply(&self, source: &[u8], patch: &[u8]) -> io::Result<Vec<u8>>;
}

/// BSDIFF40 patches, as produced by `bsdiff` and compatible tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BsDiff;

impl Delta for BsDiff {
  fn apply(&self, source: &[u8], patch: &[u8]) -> io::Result<Vec<u8>> {
    let patcher = qbsdiff::Bspatch::new(patch)?;
    let mut target = Vec::with_capacity(patcher.hint_target_size() as usize);
    patcher.apply(source, io::Cursor::new(&mut target))?;
    Ok(target)
  }
}
