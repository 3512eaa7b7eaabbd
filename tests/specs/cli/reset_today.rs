//! `--reset-today` (§6.5): a testing aid that deletes today's journal,
//! refusing while another instance holds the instance lock.

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
fn reset_today_deletes_an_existing_journal() {
    let fx = Fixture::new();
    fx.write_config(unconditional_config());

    let mut child = fx.cmd(&[]).spawn().expect("daemon starts");
    let created = wait_for(5_000, || fx.current_journal_path().exists());
    assert!(created, "journal should be created shortly after startup");
    let _ = child.kill();
    let _ = child.wait();
    // Release of the lock file happens on graceful shutdown only; a
    // SIGKILL leaves it stale, which --reset-today's own lock-acquire
    // reclaims just like a real crash (§4.5/E3).

    fx.run(&["--reset-today"]).assert_code(0);
    assert!(!fx.current_journal_path().exists());
}

#[test]
fn reset_today_refuses_while_a_live_instance_holds_the_lock() {
    let fx = Fixture::new();
    fx.write_config(unconditional_config());

    let mut child = fx.cmd(&[]).spawn().expect("daemon starts");
    let created = wait_for(5_000, || fx.state_dir.join("instance.lock").exists());
    assert!(created, "instance lock should appear shortly after startup");

    let output = fx.run(&["--reset-today"]);
    output.assert_code(3);
    assert!(
        fx.current_journal_path().exists(),
        "journal must survive a refused reset"
    );

    let _ = child.kill();
    let _ = child.wait();
}
