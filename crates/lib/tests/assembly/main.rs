//! End-to-end assembly tests against on-disk bundles.

mod idempotence_tests;
mod integrity_tests;
