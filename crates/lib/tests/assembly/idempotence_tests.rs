//! Re-running over an assembled tree must not redo any work.

use clasp_lib::util::hash::hash_bytes;

use super::common::{ORIG, PATCHED, TestEnv};

#[tokio::test]
async fn second_run_does_no_work() {
  let env = TestEnv::new();
  env.cached_baseline(&[
    ("META-INF/versions/server.txt", ORIG),
    ("META-INF/libraries/dep.txt", &b"dependency"[..]),
  ]);
  env.server_patch();
  env.bundled_entry("libraries", "bundled", "bundled.txt", b"bundled");
  env.append_line("libraries.list", &format!("{}\tdep\tdep.txt", hash_bytes(b"dependency")));

  let first = env.assemble().await.unwrap();
  let second = env.assemble().await.unwrap();

  assert_eq!(first.report.extracted, 2);
  assert_eq!(first.report.patched, 1);

  assert!(second.report.is_noop());
  assert!(!second.report.downloaded);
  assert_eq!(second.report.extracted, 0);
  assert_eq!(second.report.patched, 0);
  assert_eq!(second.report.reused, 2);
  assert_eq!(second.report.patches_reused, 1);
  assert_eq!(first.registry, second.registry);
}

#[tokio::test]
async fn damaged_output_is_repaired_on_rerun() {
  let env = TestEnv::new();
  env.cached_baseline(&[("META-INF/versions/server.txt", ORIG)]);
  env.server_patch();

  env.assemble().await.unwrap();
  let out = env.output("versions", "server.txt");
  std::fs::write(&out, b"damaged").unwrap();

  let rerun = env.assemble().await.unwrap();

  assert_eq!(rerun.report.patched, 1);
  assert_eq!(std::fs::read(&out).unwrap(), PATCHED);
}
