//! Shared helpers for the command-line tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated working directory holding a small base install and a patch
/// payload. The binary runs with this directory as its working directory so
/// the default log file and settings file stay inside it.
pub struct TestEnv {
    #[allow(dead_code)]
    temp_dir: TempDir,
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp dir");

        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Same as [`TestEnv::new`] with `base/` and `patch/` populated.
    pub fn with_trees() -> Self {
        let env = Self::new();
        env.write_file("base/a/b.txt", "base b");
        env.write_file("base/a/c/d.txt", "base d");
        env.write_file("patch/a/b.txt", "patched b");
        env.write_file("patch/e/f.txt", "new f");
        env
    }

    /// The binary, run from the test directory, without any flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("overlink").expect("Failed to find overlink binary");
        cmd.current_dir(&self.temp_path);
        cmd
    }

    /// The binary with the log file disabled.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--no-log-file");
        cmd
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.temp_path.join(relative)
    }

    pub fn write_file(&self, relative: &str, contents: &str) {
        let path = self.join(relative);
        fs::create_dir_all(path.parent().expect("Test files always have a parent"))
            .expect("Failed to create parent directory");
        fs::write(path, contents).expect("Failed to write test file");
    }

    pub fn link_target(&self, relative: &str) -> PathBuf {
        fs::read_link(self.join(relative)).expect("Expected a symlink")
    }

    pub fn clone_base(&self) {
        self.command()
            .args(["--clone", "--source", "base", "--destination", "clone"])
            .assert()
            .success();
    }
}
