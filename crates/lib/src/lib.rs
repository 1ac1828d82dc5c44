//! clasp-lib: bundle assembly and launch engine for clasp
//!
//! This crate turns a content-addressed bundle into a runnable application:
//! - `manifest`: file-entry lists, the patch list and the remote descriptor
//! - `fetch`: downloading and caching the optional baseline archive
//! - `extract`: materializing plain files from the bundle or the baseline
//! - `patch`: applying binary patches to baseline files
//! - `registry`: resolved locations consumed by the launcher
//! - `launch`: loading the assembled artifacts and running the entry point
//! - `pipeline`: the stage machine tying everything together

pub mod bundle;
pub mod consts;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod launch;
pub mod manifest;
pub mod patch;
pub mod pipeline;
pub mod registry;
pub mod util;

pub use error::{Error, ErrorKind, Result};
