//! Bundle manifests.
//!
//! A bundle describes what to assemble through three tab-delimited formats:
//! - file-entry lists (`<category>.list`): files to materialize
//! - the patch list (`patches.list`): baseline files to transform
//! - the remote descriptor (`download-context`): the optional baseline archive

mod parse;
mod types;

pub use parse::*;
pub use types::*;
