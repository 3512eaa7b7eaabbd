//! Test helpers for `dayorchd` command-line specifications.
//!
//! These tests are black-box: they invoke the built binary and assert on
//! stdout, stderr, and exit codes, the same way the unit suites in each
//! crate assert against library types directly.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Locate the built `dayorchd` binary, mirroring `assert_cmd`'s own
/// resolution but falling back to the test binary's own directory when
/// `CARGO_MANIFEST_DIR` points at a stale checkout (e.g. a removed
/// worktree sharing a `target/` directory).
fn binary_path() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let standard = manifest_dir.join("target/debug/dayorchd");
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("dayorchd");
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn dayorchd() -> Command {
    Command::new(binary_path())
}

/// A scratch orchestrator root: `root/`, `state/`, `log/` directories plus
/// a `config.toml` the caller fills in with [`Fixture::write_config`].
pub struct Fixture {
    _dir: tempfile::TempDir,
    pub root_dir: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root_dir = dir.path().join("root");
        let state_dir = dir.path().join("state");
        let log_dir = dir.path().join("log");
        std::fs::create_dir_all(&root_dir).expect("mkdir root");
        std::fs::create_dir_all(&state_dir).expect("mkdir state");
        std::fs::create_dir_all(&log_dir).expect("mkdir log");
        let config_path = dir.path().join("config.toml");
        Self {
            _dir: dir,
            root_dir,
            state_dir,
            log_dir,
            config_path,
        }
    }

    /// Write `body` as the `[[steps]]`/top-level-key section of the
    /// config document, with `root_dir`/`state_dir`/`log_dir` already
    /// filled in to this fixture's scratch directories.
    pub fn write_config(&self, body: &str) {
        let doc = format!(
            r#"
root_dir = "{root}"
state_dir = "{state}"
log_dir = "{log}"
mailer_executable = ""
mailer_args_template = "--kind {{kind}} --subject {{subject}}"

[process_hygiene]
patterns = []

{body}
"#,
            root = self.root_dir.display(),
            state = self.state_dir.display(),
            log = self.log_dir.display(),
        );
        let mut f = std::fs::File::create(&self.config_path).expect("create config");
        f.write_all(doc.as_bytes()).expect("write config");
    }

    pub fn current_journal_path(&self) -> PathBuf {
        self.state_dir.join("current.json")
    }

    pub fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = dayorchd();
        cmd.arg("--config").arg(&self.config_path);
        cmd.args(args);
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd(args).output().expect("dayorchd should run")
    }
}

pub trait OutputExt {
    fn stdout_str(&self) -> String;
    fn stderr_str(&self) -> String;
    fn assert_code(&self, expected: i32) -> &Self;
}

impl OutputExt for Output {
    fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    fn assert_code(&self, expected: i32) -> &Self {
        assert_eq!(
            self.status.code(),
            Some(expected),
            "expected exit code {expected}, got {:?}\nstdout: {}\nstderr: {}",
            self.status.code(),
            self.stdout_str(),
            self.stderr_str()
        );
        self
    }
}

/// Poll `condition` until it returns true or the timeout elapses.
pub fn wait_for<F: FnMut() -> bool>(timeout_ms: u64, mut condition: F) -> bool {
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    false
}
