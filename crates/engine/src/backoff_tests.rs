// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    first_attempt = { 1, Duration::from_secs(30) },
    second_attempt = { 2, Duration::from_secs(60) },
    third_attempt = { 3, Duration::from_secs(120) },
    fourth_attempt = { 4, Duration::from_secs(240) },
    fifth_attempt_caps_at_max = { 5, Duration::from_secs(300) },
    tenth_attempt_still_capped = { 10, Duration::from_secs(300) },
)]
fn doubles_then_caps(attempts_so_far: u32, expected: Duration) {
    assert_eq!(backoff_delay(attempts_so_far), expected);
}

#[test]
fn zero_attempts_treated_as_first() {
    assert_eq!(backoff_delay(0), Duration::from_secs(30));
}

#[test]
fn jitter_stays_within_twenty_percent() {
    let base = Duration::from_secs(60);
    for _ in 0..200 {
        let j = jittered(base);
        assert!(j >= Duration::from_millis(48_000));
        assert!(j <= Duration::from_millis(72_000));
    }
}
