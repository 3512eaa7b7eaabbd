//! `--help`/`--version` output (ambient CLI polish clap provides for free).

use crate::prelude::*;

#[test]
fn help_shows_usage_and_every_flag() {
    let output = dayorchd().arg("--help").output().expect("runs");
    output.assert_code(0);
    let stdout = output.stdout_str();
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--validate"));
    assert!(stdout.contains("--status"));
    assert!(stdout.contains("--reset-today"));
}

#[test]
fn version_shows_a_version_string() {
    let output = dayorchd().arg("--version").output().expect("runs");
    output.assert_code(0);
    assert!(output.stdout_str().contains("dayorchd"));
}
