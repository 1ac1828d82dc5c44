//! Materialization of file-entry lists.
//!
//! Each listed file is copied into `<repo>/<category>/<path>` from the bundle
//! or, failing that, from the baseline archive. Paths claimed by a patch are
//! left to the patch applier.

use tracing::debug;

use crate::bundle::{ResourceSource, resource_path};
use crate::error::{Error, Result, ensure_hash};
use crate::manifest::{FileEntry, PatchRecord};
use crate::pipeline::AssemblyContext;
use crate::util::hash::validate_path;

/// Materialize every entry of `category` and register its location.
pub fn materialize(
  ctx: &mut AssemblyContext,
  category: &str,
  entries: &[FileEntry],
  patches: &[PatchRecord],
) -> Result<()> {
  for entry in entries {
    materialize_entry(ctx, category, entry, patches)?;
  }
  Ok(())
}

fn materialize_entry(
  ctx: &mut AssemblyContext,
  category: &str,
  entry: &FileEntry,
  patches: &[PatchRecord],
) -> Result<()> {
  if patches.iter().any(|p| p.claims(category, &entry.path)) {
    debug!(category, path = %entry.path, "left to patch");
    ctx.report.claimed_by_patch += 1;
    return Ok(());
  }

  let out = ctx.output_path(category, &entry.path);
  if validate_path(&out, &entry.hash).map_err(|e| Error::io(&out, e))? {
    debug!(path = %out.display(), "already extracted");
    ctx.registry.insert(category, &entry.path, out);
    ctx.report.reused += 1;
    return Ok(());
  }

  let bytes = read_source(ctx, category, &entry.path)?;
  ensure_hash("extracted file", out.display().to_string(), &bytes, &entry.hash)?;
  ctx.write_output(&out, &bytes)?;

  debug!(id = %entry.id, path = %out.display(), "extracted");
  ctx.registry.insert(category, &entry.path, out);
  ctx.report.extracted += 1;
  Ok(())
}

/// Bundled content first, the baseline archive second.
fn read_source(ctx: &mut AssemblyContext, category: &str, path: &str) -> Result<Vec<u8>> {
  if let Some(bytes) = ctx.bundle.read_category_file(category, path)? {
    return Ok(bytes);
  }

  let Some(baseline) = ctx.baseline.as_mut() else {
    return Err(Error::MissingSourceNoBaseline {
      path: path.to_string(),
    });
  };

  baseline
    .read(&resource_path(category, path))?
    .ok_or_else(|| Error::MissingSource {
      path: path.to_string(),
    })
}
