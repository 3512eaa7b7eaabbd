// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn local_at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

#[test]
fn system_clock_reports_current_date() {
    let clock = SystemClock;
    let now = clock.now();
    assert_eq!(clock.today(), now.date_naive());
}

#[test]
fn fake_clock_starts_at_the_given_instant() {
    let at = local_at(2026, 7, 27, 8, 0, 0);
    let clock = FakeClock::new(at);
    assert_eq!(clock.now(), at);
    assert_eq!(clock.today(), at.date_naive());
}

#[test]
fn fake_clock_advance_moves_forward() {
    let at = local_at(2026, 7, 27, 8, 0, 0);
    let clock = FakeClock::new(at);
    clock.advance(chrono::Duration::hours(2));
    assert_eq!(clock.now(), local_at(2026, 7, 27, 10, 0, 0));
}

#[test]
fn fake_clock_set_jumps_to_an_explicit_moment() {
    let clock = FakeClock::new(local_at(2026, 7, 27, 8, 0, 0));
    let midnight_rollover = local_at(2026, 7, 28, 0, 0, 0);
    clock.set(midnight_rollover);
    assert_eq!(clock.now(), midnight_rollover);
    assert_eq!(clock.today(), midnight_rollover.date_naive());
}
