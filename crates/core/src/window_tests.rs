// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{Local, TimeZone};

fn at(h: u32, m: u32) -> DateTime<Local> {
    // 2026-07-27 is a Monday.
    Local.with_ymd_and_hms(2026, 7, 27, h, m, 0).unwrap()
}

fn win(sh: u32, sm: u32, eh: u32, em: u32) -> Window {
    Window::new(
        NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
        NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
    )
}

#[yare::parameterized(
    before_window   = { 8, 59, WindowEvaluation::NotYet },
    window_start    = { 9, 0,  WindowEvaluation::InWindow },
    inside_window   = { 9, 5,  WindowEvaluation::InWindow },
    window_end      = { 9, 10, WindowEvaluation::InWindow },
    after_window    = { 9, 11, WindowEvaluation::Missed },
    much_later      = { 20, 0, WindowEvaluation::Missed },
)]
fn single_window_evaluation(h: u32, m: u32, expected: WindowEvaluation) {
    let windows = [win(9, 0, 9, 10)];
    let days = all_weekdays();
    assert_eq!(evaluate(&windows, &days, at(h, m)), expected);
}

#[test]
fn between_two_windows_is_not_yet() {
    let windows = [win(9, 0, 9, 10), win(12, 30, 12, 40)];
    let days = all_weekdays();
    assert_eq!(evaluate(&windows, &days, at(10, 0)), WindowEvaluation::NotYet);
}

#[test]
fn empty_windows_are_always_in_window() {
    let days = all_weekdays();
    assert_eq!(evaluate(&[], &days, at(3, 0)), WindowEvaluation::InWindow);
}

#[test]
fn not_today_wins_over_window_membership() {
    // Saturday, weekdays-only requirement.
    let saturday = Local.with_ymd_and_hms(2026, 8, 1, 9, 5, 0).unwrap();
    let windows = [win(9, 0, 9, 10)];
    let days: BTreeSet<Weekday> = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        .into_iter()
        .collect();
    assert_eq!(evaluate(&windows, &days, saturday), WindowEvaluation::NotToday);
}

#[test]
fn validate_rejects_inverted_window() {
    let windows = [win(9, 10, 9, 0)];
    assert!(matches!(
        validate_windows(&windows),
        Err(WindowError::Inverted(_))
    ));
}

#[test]
fn validate_rejects_overlap() {
    let windows = [win(9, 0, 9, 10), win(9, 5, 9, 20)];
    assert!(matches!(
        validate_windows(&windows),
        Err(WindowError::Overlapping { .. })
    ));
}

#[test]
fn validate_accepts_sorted_non_overlapping_windows() {
    let windows = [win(9, 0, 9, 10), win(12, 30, 12, 40)];
    assert!(validate_windows(&windows).is_ok());
}

proptest::proptest! {
    #[test]
    fn in_window_iff_now_in_union_of_windows(minute in 0i64..1440) {
        let windows = [win(9, 0, 9, 10), win(12, 30, 12, 40)];
        let days = all_weekdays();
        let now = at(0, 0) + chrono::Duration::minutes(minute);
        let expected_in_window = windows.iter().any(|w| w.contains(now.time()));
        let actual = evaluate(&windows, &days, now).is_in_window();
        proptest::prop_assert_eq!(actual, expected_in_window);
    }
}
