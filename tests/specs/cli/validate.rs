//! `--validate` (§6.5/§7): load and validate configuration, exit without
//! touching the journal or lock.

use crate::prelude::*;

#[test]
fn a_well_formed_config_validates_and_exits_zero() {
    let fx = Fixture::new();
    fx.write_config(
        r#"
[[steps]]
name = "dl_am"
kind = "unconditional"
executable = "/bin/true"
timeout = "5m"
"#,
    );

    fx.run(&["--validate"]).assert_code(0);
    assert!(
        !fx.current_journal_path().exists(),
        "--validate must not create a journal"
    );
    assert!(
        !fx.state_dir.join("instance.lock").exists(),
        "--validate must not acquire the instance lock"
    );
}

#[test]
fn an_unknown_dependency_fails_validation_with_exit_code_2() {
    let fx = Fixture::new();
    fx.write_config(
        r#"
[[steps]]
name = "merge"
kind = "dependency_gated"
executable = "/bin/true"
timeout = "1m"
dependencies = ["does_not_exist"]
"#,
    );

    let output = fx.run(&["--validate"]);
    output.assert_code(2);
    assert!(output.stderr_str().contains("does_not_exist") || output.stderr_str().len() > 0);
}

#[test]
fn a_missing_executable_fails_validation_with_exit_code_2() {
    let fx = Fixture::new();
    fx.write_config(
        r#"
[[steps]]
name = "dl_am"
kind = "unconditional"
executable = "/no/such/executable/on/this/host"
timeout = "5m"
"#,
    );

    fx.run(&["--validate"]).assert_code(2);
}

#[test]
fn a_dependency_cycle_fails_validation_with_exit_code_2() {
    let fx = Fixture::new();
    fx.write_config(
        r#"
[[steps]]
name = "a"
kind = "dependency_gated"
executable = "/bin/true"
timeout = "1m"
dependencies = ["b"]

[[steps]]
name = "b"
kind = "dependency_gated"
executable = "/bin/true"
timeout = "1m"
dependencies = ["a"]
"#,
    );

    fx.run(&["--validate"]).assert_code(2);
}

#[test]
fn a_malformed_document_fails_validation_with_exit_code_2() {
    let fx = Fixture::new();
    std::fs::write(&fx.config_path, "this is not valid toml {{{").expect("write");

    fx.run(&["--validate"]).assert_code(2);
}

#[test]
fn a_missing_config_file_fails_with_exit_code_2() {
    let fx = Fixture::new();
    std::fs::remove_file(&fx.config_path).ok();

    fx.run(&["--validate"]).assert_code(2);
}
