//! Shared utilities.
//!
//! Content hashing plus test helpers for building bundles on disk.

pub mod hash;
