// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock & Window Evaluator (C1): pure functions from wall-clock time to
//! window eligibility. No I/O, no mutable state — everything here takes
//! `now` as an argument so it is exhaustively testable without sleeping.

use chrono::{DateTime, Local, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A closed local-time-of-day interval during which a step is eligible to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Window {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether `time` falls within this closed interval.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }

    /// Whether `time` is still before this window opens.
    fn is_future(&self, time: NaiveTime) -> bool {
        time < self.start
    }

    /// Whether `time` is past this window's end.
    fn has_passed(&self, time: NaiveTime) -> bool {
        time > self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Result of evaluating a step's windows against `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvaluation {
    /// All windows are in the future today.
    NotYet,
    /// `now` falls inside one of the step's windows.
    InWindow,
    /// All windows have ended but the day is not over.
    Missed,
    /// Today is not in the step's `required_days_of_week`.
    NotToday,
}

impl WindowEvaluation {
    pub fn is_in_window(&self) -> bool {
        matches!(self, WindowEvaluation::InWindow)
    }

    pub fn is_missed(&self) -> bool {
        matches!(self, WindowEvaluation::Missed)
    }
}

/// Error returned when a step's configured windows are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("window {a} and {b} overlap")]
    Overlapping { a: Window, b: Window },
    #[error("window {0} has end before start")]
    Inverted(Window),
}

/// Validate that a step's windows are individually well-formed, sorted in
/// start order, and pairwise non-overlapping. Called once at config load;
/// the Pipeline Engine assumes this has already been checked.
pub fn validate_windows(windows: &[Window]) -> Result<(), WindowError> {
    for w in windows {
        if w.end < w.start {
            return Err(WindowError::Inverted(*w));
        }
    }
    for pair in windows.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.start > b.start {
            return Err(WindowError::Overlapping { a, b });
        }
        if a.end >= b.start {
            return Err(WindowError::Overlapping { a, b });
        }
    }
    Ok(())
}

/// Evaluate a step's eligibility at `now`.
///
/// `windows` must already be validated (sorted, non-overlapping) via
/// [`validate_windows`]. An empty `windows` list (DependencyGated or
/// Unconditional steps) always evaluates to `InWindow`, since such steps
/// have no time-of-day gate of their own.
pub fn evaluate(
    windows: &[Window],
    required_days_of_week: &BTreeSet<Weekday>,
    now: DateTime<Local>,
) -> WindowEvaluation {
    let weekday = now.weekday();
    if !required_days_of_week.is_empty() && !required_days_of_week.contains(&weekday) {
        return WindowEvaluation::NotToday;
    }
    if windows.is_empty() {
        return WindowEvaluation::InWindow;
    }
    let time = now.time();
    if windows.iter().any(|w| w.contains(time)) {
        return WindowEvaluation::InWindow;
    }
    if windows.iter().all(|w| w.is_future(time)) {
        return WindowEvaluation::NotYet;
    }
    if windows.iter().all(|w| w.has_passed(time) || w.is_future(time)) {
        return WindowEvaluation::Missed;
    }
    WindowEvaluation::Missed
}

/// The full set of weekdays, used as the default `required_days_of_week`.
pub fn all_weekdays() -> BTreeSet<Weekday> {
    use Weekday::*;
    [Mon, Tue, Wed, Thu, Fri, Sat, Sun].into_iter().collect()
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
