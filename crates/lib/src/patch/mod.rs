//! Binary patch application.
//!
//! A patch turns a baseline file into an output file. Each stage is checked
//! against its own hash: the baseline input, the bundled payload and the
//! result. The result is registered under the *original* path so that
//! consumers asking for the baseline file name receive the patched content.

mod delta;

pub use delta::*;

use tracing::{debug, info};

use crate::bundle::{ResourceSource, resource_path};
use crate::error::{Error, Result, ensure_hash};
use crate::manifest::PatchRecord;
use crate::pipeline::AssemblyContext;
use crate::util::hash::validate_path;

/// Apply `patches` in order.
pub fn apply_patches(ctx: &mut AssemblyContext, patches: &[PatchRecord]) -> Result<()> {
  for patch in patches {
    apply_patch(ctx, patch)?;
  }
  Ok(())
}

fn apply_patch(ctx: &mut AssemblyContext, patch: &PatchRecord) -> Result<()> {
  let out = ctx.output_path(&patch.category, &patch.path_output);
  if validate_path(&out, &patch.hash_output).map_err(|e| Error::io(&out, e))? {
    debug!(path = %out.display(), "already patched");
    ctx.registry.insert(&patch.category, &patch.path_orig, out);
    ctx.report.patches_reused += 1;
    return Ok(());
  }

  if !ctx.patches_started {
    info!("applying patches");
    ctx.patches_started = true;
  }

  let src_path = resource_path(&patch.category, &patch.path_orig);
  let baseline = ctx.baseline.as_mut().ok_or(Error::PatchesWithoutRemote)?;
  let source = baseline.read(&src_path)?.ok_or_else(|| Error::MissingSource {
    path: format!("{}!/{}", baseline.describe(), src_path),
  })?;
  ensure_hash("input file", &src_path, &source, &patch.hash_orig)?;

  let payload_path = resource_path(&patch.category, &patch.path_patch);
  let payload = ctx
    .bundle
    .read_category_file(&patch.category, &patch.path_patch)?
    .ok_or_else(|| Error::MissingPatch {
      path: payload_path.clone(),
    })?;
  ensure_hash("patch file", &payload_path, &payload, &patch.hash_patch)?;

  let output = ctx.delta.apply(&source, &payload).map_err(|source| Error::Delta {
    path: src_path.clone(),
    source,
  })?;
  ensure_hash("patched output", out.display().to_string(), &output, &patch.hash_output)?;
  ctx.write_output(&out, &output)?;

  debug!(orig = %patch.path_orig, out = %out.display(), "patched");
  ctx.registry.insert(&patch.category, &patch.path_orig, out);
  ctx.report.patched += 1;
  Ok(())
}
