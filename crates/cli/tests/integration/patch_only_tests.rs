//! Patch-only runs: assemble the repository and stop before launching.

use predicates::prelude::*;

use super::common::{PATCHED, TestEnv};

#[test]
fn extracts_bundled_file() {
  let env = TestEnv::new();
  env.bundled_entry("versions", "server.txt", b"server build 1");

  env
    .clasp_cmd()
    .arg("--patch-only")
    .assert()
    .success()
    .stdout(predicate::str::contains("Assembly complete"))
    .stdout(predicate::str::contains("Files extracted: 1"));

  let out = env.repo_path().join("versions").join("server.txt");
  assert_eq!(std::fs::read(out).unwrap(), b"server build 1");
}

#[test]
fn patch_only_from_environment() {
  let env = TestEnv::new();
  env.bundled_entry("libraries", "lib.txt", b"lib");

  env.clasp_cmd().env("CLASP_PATCH_ONLY", "true").assert().success();

  assert!(env.repo_path().join("libraries").join("lib.txt").exists());
}

#[test]
fn applies_patch_from_cached_baseline() {
  let env = TestEnv::new();
  env.patched_server();

  env
    .clasp_cmd()
    .arg("--patch-only")
    .assert()
    .success()
    .stdout(predicate::str::contains("Patches applied: 1"));

  let out = env.repo_path().join("versions").join("server.txt");
  assert_eq!(std::fs::read(out).unwrap(), PATCHED);
}

#[test]
fn rerun_reuses_everything() {
  let env = TestEnv::new();
  env.patched_server();

  env.clasp_cmd().arg("--patch-only").assert().success();
  env
    .clasp_cmd()
    .arg("--patch-only")
    .assert()
    .success()
    .stdout(predicate::str::contains("Patches applied: 0"))
    .stdout(predicate::str::contains("Patches reused: 1"));
}

#[test]
fn json_summary_lists_registry() {
  let env = TestEnv::new();
  env.patched_server();

  let output = env
    .clasp_cmd()
    .args(["--patch-only", "--format", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["report"]["patched"], 1);
  assert_eq!(json["report"]["downloaded"], false);
  let versions = &json["registry"]["categories"][0];
  assert_eq!(versions["name"], "versions");
  assert_eq!(versions["entries"][0][0], "server.txt");
}

#[test]
fn patches_without_download_context_fail() {
  let env = TestEnv::new();
  env.patched_server();
  std::fs::remove_file(env.bundle_path().join("META-INF").join("download-context")).unwrap();

  env
    .clasp_cmd()
    .arg("--patch-only")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to read bundle manifests"))
    .stderr(predicate::str::contains("download-context"));
}

#[test]
fn corrupted_bundle_file_fails_with_integrity_error() {
  let env = TestEnv::new();
  env.bundled_entry("versions", "server.txt", b"expected");
  env.write_resource("versions/server.txt", b"tampered");

  env
    .clasp_cmd()
    .arg("--patch-only")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to extract files"))
    .stderr(predicate::str::contains("hash validation failed"));

  assert!(!env.repo_path().join("versions").join("server.txt").exists());
}

#[test]
fn working_directory_with_bang_is_refused() {
  let env = TestEnv::new();
  env.bundled_entry("versions", "server.txt", b"server");
  let bad_dir = env.temp.path().join("bad!dir");
  std::fs::create_dir_all(&bad_dir).unwrap();

  env
    .clasp_cmd()
    .current_dir(&bad_dir)
    .arg("--patch-only")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("contains '!'"));

  assert!(!env.repo_path().exists());
}
