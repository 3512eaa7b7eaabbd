//! `--status` (§6.5): a human-readable rendering of today's journal,
//! readable without acquiring the instance lock.

use crate::prelude::*;

fn unconditional_config() -> &'static str {
    r#"
tick_interval = "100ms"

[[steps]]
name = "dl_am"
kind = "unconditional"
executable = "/bin/true"
timeout = "5s"
"#
}

#[test]
fn status_before_any_run_fails_because_no_journal_exists_yet() {
    let fx = Fixture::new();
    fx.write_config(unconditional_config());

    fx.run(&["--status"]).assert_code(1);
}

#[test]
fn status_reports_a_completed_step_after_a_run() {
    let fx = Fixture::new();
    fx.write_config(unconditional_config());

    let mut child = fx.cmd(&[]).spawn().expect("daemon starts");

    let settled = wait_for(5_000, || {
        std::fs::read_to_string(fx.current_journal_path())
            .map(|s| s.contains("\"done\""))
            .unwrap_or(false)
    });
    assert!(settled, "dl_am should reach Done within the timeout");

    let output = fx.run(&["--status"]);
    output.assert_code(0);
    let stdout = output.stdout_str();
    assert!(stdout.contains("dl_am"));
    assert!(stdout.contains("done"));
    assert!(stdout.contains("alerts_sent"));

    let _ = child.kill();
    let _ = child.wait();
}
