//! Single-instance guarantee (§8 invariant 3, E6): two supervisors
//! started against the same `state_dir` never both progress past lock
//! acquisition.

use crate::prelude::*;

#[test]
fn a_second_instance_exits_three_while_the_first_is_running() {
    let fx = Fixture::new();
    fx.write_config(
        r#"
tick_interval = "100ms"

[[steps]]
name = "dl_am"
kind = "unconditional"
executable = "/bin/true"
timeout = "5s"
"#,
    );

    let mut first = fx.cmd(&[]).spawn().expect("first daemon starts");
    let locked = wait_for(5_000, || fx.state_dir.join("instance.lock").exists());
    assert!(locked, "first instance should acquire the lock promptly");

    let second = fx.run(&[]);
    second.assert_code(3);

    let _ = first.kill();
    let _ = first.wait();
}
