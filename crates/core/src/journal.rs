// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Daily Journal: the whole state for a given Day.
//!
//! This module owns the pure data shape and in-memory mutators only.
//! Atomic on-disk persistence, rollover file renaming and `.bak` rotation
//! live in `dayorch-storage`, which wraps a `DailyJournal` with the
//! tempfile-fsync-rename sequence.

use crate::step::StepDef;
use crate::step_state::StepState;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Schema version of the on-disk Journal format. Bumped whenever the shape
/// below changes in a way that requires a migration on read.
pub const JOURNAL_SCHEMA_VERSION: u32 = 1;

/// The whole state for a given Day: `{date, steps, alerts_sent}`.
///
/// # Idempotency requirement
///
/// All mutators on this type must be safe to apply twice with the same
/// inputs (e.g. replaying a journal write after a crash during the atomic
/// rename must never double-count an attempt or duplicate an alert). Each
/// mutator below is written with that in mind; see each method's doc
/// comment for the specific guarantee it provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyJournal {
    #[serde(default = "DailyJournal::current_schema_version")]
    pub schema_version: u32,
    pub date: NaiveDate,
    pub steps: BTreeMap<String, StepState>,
    #[serde(default)]
    pub alerts_sent: BTreeSet<String>,
}

impl DailyJournal {
    fn current_schema_version() -> u32 {
        JOURNAL_SCHEMA_VERSION
    }

    /// Construct a fresh Journal for `date`, seeding every configured step
    /// in `Pending` (or `Skipped` if today is excluded by its
    /// `required_days_of_week`).
    pub fn new_for_date(date: NaiveDate, steps: &[StepDef]) -> Self {
        let weekday = date.weekday();
        let mut map = BTreeMap::new();
        for step in steps {
            let state = if !step.required_days_of_week.is_empty()
                && !step.required_days_of_week.contains(&weekday)
            {
                StepState::skipped()
            } else {
                StepState::default()
            };
            map.insert(step.name.as_str().to_string(), state);
        }
        Self {
            schema_version: Self::current_schema_version(),
            date,
            steps: map,
            alerts_sent: BTreeSet::new(),
        }
    }

    pub fn step(&self, name: &str) -> Option<&StepState> {
        self.steps.get(name)
    }

    pub fn step_mut(&mut self, name: &str) -> Option<&mut StepState> {
        self.steps.get_mut(name)
    }

    /// Whether every step has reached a terminal status for the day
    /// (`Done`, `Failed`, or `Skipped`). Used to decide when the
    /// end-of-day summary alert can fire.
    pub fn all_steps_settled(&self) -> bool {
        self.steps.values().all(|s| {
            s.status.is_terminal_for_day() || s.status == crate::step_state::StepStatus::Failed
        })
    }

    /// Record that an alert has been sent for `(self.date, alert_key)`.
    /// Idempotent: recording the same key twice is a no-op the second time.
    /// Returns `true` if this call actually recorded a new alert (i.e. the
    /// caller should go on to deliver it).
    pub fn record_alert_sent(&mut self, alert_key: impl Into<String>) -> bool {
        self.alerts_sent.insert(alert_key.into())
    }

    pub fn alert_already_sent(&self, alert_key: &str) -> bool {
        self.alerts_sent.contains(alert_key)
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
