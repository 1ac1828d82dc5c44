//! Shared test helpers for CLI integration tests.

use std::io::Write;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use clasp_lib::util::hash::hash_bytes;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const ORIG: &[u8] = b"server.txt from the upstream baseline";
pub const PATCHED: &[u8] = b"server.txt with downstream changes";

/// Isolated test environment.
///
/// Each test gets its own bundle directory, repository and working directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn bundle_path(&self) -> PathBuf {
    let p = self.temp.path().join("bundle");
    std::fs::create_dir_all(&p).unwrap();
    p
  }

  pub fn repo_path(&self) -> PathBuf {
    self.temp.path().join("repo")
  }

  pub fn work_dir(&self) -> PathBuf {
    let p = self.temp.path().join("work");
    std::fs::create_dir_all(&p).unwrap();
    p
  }

  /// Write a file under the bundle's `META-INF`.
  pub fn write_resource(&self, relative: &str, content: &[u8]) {
    let path = self.bundle_path().join("META-INF").join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }

  /// List and bundle a file.
  pub fn bundled_entry(&self, category: &str, path: &str, content: &[u8]) {
    let list = format!("{}\t{}\t{}\n", hash_bytes(content), path, path);
    self.write_resource(&format!("{}.list", category), list.as_bytes());
    self.write_resource(&format!("{}/{}", category, path), content);
  }

  /// Cache a baseline holding `ORIG` and declare a patch from it to `PATCHED`.
  pub fn patched_server(&self) {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip
      .start_file("META-INF/versions/server.txt", SimpleFileOptions::default())
      .unwrap();
    zip.write_all(ORIG).unwrap();
    let archive = zip.finish().unwrap().into_inner();

    let cache = self.repo_path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    std::fs::write(cache.join("baseline.jar"), &archive).unwrap();
    self.write_resource(
      "download-context",
      format!("{}\thttp://127.0.0.1:9/baseline.jar\tbaseline.jar\n", hash_bytes(&archive)).as_bytes(),
    );

    let mut payload = Vec::new();
    qbsdiff::Bsdiff::new(ORIG, PATCHED).compare(&mut payload).unwrap();
    self.write_resource("versions/server.patch", &payload);
    self.write_resource(
      "patches.list",
      format!(
        "# category\torig\tpatch\toutput\n\nversions\t{}\t{}\t{}\tserver.txt\tserver.patch\tserver.txt\n",
        hash_bytes(ORIG),
        hash_bytes(&payload),
        hash_bytes(PATCHED)
      )
      .as_bytes(),
    );
  }

  /// Compile the `app_main` test library and return its bytes.
  pub fn app_library(&self) -> Vec<u8> {
    let source = concat!(env!("CARGO_MANIFEST_DIR"), "/../lib/tests/fixtures/app_main.rs");
    let build = self.temp.path().join("build");
    std::fs::create_dir_all(&build).unwrap();
    let out = build.join(library_file_name());
    let rustc = std::env::var_os("RUSTC").unwrap_or_else(|| "rustc".into());

    let status = std::process::Command::new(rustc)
      .args(["--edition", "2024", "--crate-type", "cdylib", "--crate-name", "app_main", "-o"])
      .arg(&out)
      .arg(source)
      .status()
      .unwrap();
    assert!(status.success(), "failed to build the app_main test library");
    std::fs::read(out).unwrap()
  }

  /// Get a pre-configured Command for the clasp binary.
  ///
  /// Points the bundle and repository at the isolated directories and clears
  /// configuration inherited from the caller's environment.
  pub fn clasp_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("clasp");
    cmd.current_dir(self.work_dir());
    cmd.env_remove("CLASP_PATCH_ONLY");
    cmd.env_remove("CLASP_ENTRY_POINT");
    cmd.env("CLASP_BUNDLE", self.bundle_path());
    cmd.env("CLASP_REPO_DIR", self.repo_path());
    cmd.env("NO_COLOR", "1");
    cmd
  }
}

/// `app_main` with the platform's dynamic library prefix and extension.
pub fn library_file_name() -> String {
  format!(
    "{}app_main.{}",
    std::env::consts::DLL_PREFIX,
    std::env::consts::DLL_EXTENSION
  )
}
