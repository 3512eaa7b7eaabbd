// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{Local, TimeZone};

fn at(h: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 7, 27, h, 0, 0).unwrap()
}

#[test]
fn default_state_is_pending_with_zero_attempts() {
    let s = StepState::default();
    assert_eq!(s.status, StepStatus::Pending);
    assert_eq!(s.attempts_today, 0);
}

#[test]
fn mark_started_increments_attempts_and_sets_running() {
    let mut s = StepState::default();
    s.mark_started(at(9));
    assert_eq!(s.status, StepStatus::Running);
    assert_eq!(s.attempts_today, 1);
    s.mark_pending_for_retry(at(9));
    s.mark_started(at(9));
    assert_eq!(s.attempts_today, 2);
}

#[test]
fn mark_done_clears_error_state() {
    let mut s = StepState::default();
    s.mark_started(at(9));
    s.mark_failed(at(9), Some(1), "boom", false);
    s.mark_pending_for_retry(at(9));
    s.mark_started(at(9));
    s.mark_done(at(9), 0);
    assert_eq!(s.status, StepStatus::Done);
    assert_eq!(s.last_exit_code, Some(0));
    assert!(s.last_error_message.is_none());
    assert!(!s.killed_due_to_timeout);
}

#[test]
fn mark_failed_truncates_long_error_messages() {
    let mut s = StepState::default();
    let long_message = "x".repeat(MAX_ERROR_MESSAGE_LEN + 500);
    s.mark_failed(at(9), Some(1), long_message, true);
    let stored = s.last_error_message.unwrap();
    assert!(stored.len() <= MAX_ERROR_MESSAGE_LEN + "...(truncated)".len());
    assert!(stored.ends_with("...(truncated)"));
    assert!(s.killed_due_to_timeout);
}

#[test]
fn done_and_skipped_are_terminal_for_the_day() {
    assert!(StepStatus::Done.is_terminal_for_day());
    assert!(StepStatus::Skipped.is_terminal_for_day());
    assert!(!StepStatus::Pending.is_terminal_for_day());
    assert!(!StepStatus::Running.is_terminal_for_day());
    assert!(!StepStatus::Failed.is_terminal_for_day());
}

#[test]
fn mark_pending_for_retry_records_and_clears_retry_not_before() {
    let mut s = StepState::default();
    s.mark_started(at(9));
    s.mark_failed(at(9), Some(1), "boom", false);
    s.mark_pending_for_retry(at(10));
    assert_eq!(s.retry_not_before, Some(at(10)));
    s.mark_started(at(10));
    assert_eq!(s.retry_not_before, None);
}

#[test]
fn skipped_constructor_produces_skipped_status() {
    let s = StepState::skipped();
    assert_eq!(s.status, StepStatus::Skipped);
    assert_eq!(s.attempts_today, 0);
}
