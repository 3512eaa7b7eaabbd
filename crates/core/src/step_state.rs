// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-(Day, Step) runtime state, as carried in the Daily Journal.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bound on `last_error_message`'s length, so a runaway stack trace from a
/// misbehaving job executable cannot grow the journal file unboundedly.
pub const MAX_ERROR_MESSAGE_LEN: usize = 2_000;

/// Status of a step within the current Day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
}

impl StepStatus {
    /// Terminal for the remainder of the Day: no further ticks will touch it.
    pub fn is_terminal_for_day(&self) -> bool {
        matches!(self, StepStatus::Done | StepStatus::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Running => write!(f, "running"),
            StepStatus::Done => write!(f, "done"),
            StepStatus::Failed => write!(f, "failed"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Per-(Day, Step) runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    pub status: StepStatus,
    #[serde(default)]
    pub attempts_today: u32,
    #[serde(default)]
    pub last_exit_code: Option<i32>,
    #[serde(default)]
    pub last_started_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub last_finished_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub last_error_message: Option<String>,
    /// Set when the most recent run was killed for exceeding its timeout.
    #[serde(default)]
    pub killed_due_to_timeout: bool,
    /// Earliest moment a retry may start, set by the Pipeline Engine's
    /// backoff schedule (§4.8) when a failed attempt is returned to
    /// `Pending`. Persisted so a restart mid-backoff doesn't retry early.
    #[serde(default)]
    pub retry_not_before: Option<DateTime<Local>>,
}

impl Default for StepState {
    fn default() -> Self {
        Self {
            status: StepStatus::Pending,
            attempts_today: 0,
            last_exit_code: None,
            last_started_at: None,
            last_finished_at: None,
            last_error_message: None,
            killed_due_to_timeout: false,
            retry_not_before: None,
        }
    }
}

impl StepState {
    pub fn skipped() -> Self {
        Self {
            status: StepStatus::Skipped,
            ..Self::default()
        }
    }

    pub fn mark_started(&mut self, now: DateTime<Local>) {
        self.status = StepStatus::Running;
        self.attempts_today += 1;
        self.last_started_at = Some(now);
        self.retry_not_before = None;
    }

    pub fn mark_done(&mut self, now: DateTime<Local>, exit_code: i32) {
        self.status = StepStatus::Done;
        self.last_exit_code = Some(exit_code);
        self.last_finished_at = Some(now);
        self.last_error_message = None;
        self.killed_due_to_timeout = false;
    }

    pub fn mark_failed(
        &mut self,
        now: DateTime<Local>,
        exit_code: Option<i32>,
        error_message: impl Into<String>,
        killed_due_to_timeout: bool,
    ) {
        self.status = StepStatus::Failed;
        self.last_exit_code = exit_code;
        self.last_finished_at = Some(now);
        self.last_error_message = Some(truncate_error_message(error_message.into()));
        self.killed_due_to_timeout = killed_due_to_timeout;
    }

    /// Return a failed attempt to `Pending`, gated by the Pipeline
    /// Engine's backoff schedule: `not_before` is when the next attempt
    /// may start.
    pub fn mark_pending_for_retry(&mut self, not_before: DateTime<Local>) {
        self.status = StepStatus::Pending;
        self.retry_not_before = Some(not_before);
    }

    pub fn mark_skipped(&mut self) {
        self.status = StepStatus::Skipped;
    }
}

fn truncate_error_message(mut message: String) -> String {
    if message.len() > MAX_ERROR_MESSAGE_LEN {
        message.truncate(MAX_ERROR_MESSAGE_LEN);
        message.push_str("...(truncated)");
    }
    message
}

#[cfg(test)]
#[path = "step_state_tests.rs"]
mod tests;
