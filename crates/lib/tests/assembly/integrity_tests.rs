//! Integrity failures must stop the run before anything unverified is written.

use clasp_lib::ErrorKind;
use clasp_lib::error::Error;
use clasp_lib::pipeline::Stage;

use super::common::{ORIG, TestEnv, make_patch};

#[tokio::test]
async fn corrupted_baseline_entry_fails_before_write() {
  let env = TestEnv::new();
  let mut tampered = ORIG.to_vec();
  tampered[3] ^= 0x01;
  env.cached_baseline(&[("META-INF/versions/server.txt", tampered.as_slice())]);
  env.server_patch();

  let err = env.assemble().await.unwrap_err();

  assert_eq!(err.stage, Stage::ApplyPatches);
  assert!(matches!(err.source, Error::Integrity { what: "input file", .. }));
  assert!(!env.repo().join("versions").join("server.txt").exists());
}

#[tokio::test]
async fn corrupted_bundled_payload_fails_before_write() {
  let env = TestEnv::new();
  env.cached_baseline(&[("META-INF/versions/server.txt", ORIG)]);
  env.server_patch();
  let mut payload = make_patch(ORIG, super::common::PATCHED);
  payload[0] ^= 0x01;
  env.bundle_file("versions/server.patch", &payload);

  let err = env.assemble().await.unwrap_err();

  assert_eq!(err.source.kind(), ErrorKind::Integrity);
  assert!(!env.repo().join("versions").join("server.txt").exists());
}

#[tokio::test]
async fn corrupted_bundled_file_fails_before_write() {
  let env = TestEnv::new();
  env.bundled_entry("versions", "server", "server.txt", b"good");
  env.bundle_file("versions/server.txt", b"evil");

  let err = env.assemble().await.unwrap_err();

  assert_eq!(err.stage, Stage::Extract);
  assert_eq!(err.source.kind(), ErrorKind::Integrity);
  assert!(!env.repo().join("versions").join("server.txt").exists());
}

#[tokio::test]
async fn patch_producing_wrong_output_is_rejected() {
  let env = TestEnv::new();
  env.cached_baseline(&[("META-INF/versions/server.txt", ORIG)]);
  // The payload is valid but yields something other than the declared output.
  let payload = make_patch(ORIG, b"unexpected result");
  env.append_line(
    "patches.list",
    &format!(
      "versions\t{}\t{}\t{}\tserver.txt\tserver.patch\tserver.txt",
      clasp_lib::util::hash::hash_bytes(ORIG),
      clasp_lib::util::hash::hash_bytes(&payload),
      clasp_lib::util::hash::hash_bytes(b"declared result")
    ),
  );
  env.bundle_file("versions/server.patch", &payload);

  let err = env.assemble().await.unwrap_err();

  assert!(matches!(err.source, Error::Integrity { what: "patched output", .. }));
  assert!(!env.repo().join("versions").join("server.txt").exists());
}
