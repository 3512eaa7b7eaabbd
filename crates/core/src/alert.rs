// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operational alerts the Notifier delivers (C6). Pure data + dedup-key
//! derivation; delivery itself is a `dayorch-adapters` concern.

use serde::{Deserialize, Serialize};

/// Kind of operational alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    StartupNotice,
    StepCompleted,
    StepFailed,
    DailyReport,
    Heartbeat,
}

impl AlertKind {
    fn tag(&self) -> &'static str {
        match self {
            AlertKind::StartupNotice => "startup",
            AlertKind::StepCompleted => "completed",
            AlertKind::StepFailed => "failed",
            AlertKind::DailyReport => "daily_report",
            AlertKind::Heartbeat => "heartbeat",
        }
    }
}

/// An operational alert queued for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub attachment: Option<std::path::PathBuf>,
    /// `(day, alert_key)` dedup key, recorded in `DailyJournal::alerts_sent`.
    pub dedup_key: String,
}

impl Alert {
    /// Build the per-step alert dedup key: `<step>:<kind>`. A duplicate
    /// enqueue for the same step and kind within the same day is suppressed
    /// by `DailyJournal::record_alert_sent`.
    pub fn step_dedup_key(step_name: &str, kind: AlertKind) -> String {
        format!("{}:{}", step_name, kind.tag())
    }

    pub fn daily_report(date: chrono::NaiveDate, summary: String) -> Self {
        Self {
            kind: AlertKind::DailyReport,
            subject: format!("Daily pipeline report for {}", date),
            body: summary,
            attachment: None,
            dedup_key: format!("daily_report:{}", date),
        }
    }

    pub fn heartbeat(date: chrono::NaiveDate) -> Self {
        Self {
            kind: AlertKind::Heartbeat,
            subject: "Pipeline orchestrator heartbeat".to_string(),
            body: format!("Orchestrator is alive as of {}", date),
            attachment: None,
            dedup_key: format!("heartbeat:{}", date),
        }
    }

    pub fn step_failed(step_name: &str, error_message: &str) -> Self {
        Self {
            kind: AlertKind::StepFailed,
            subject: format!("Step {} failed", step_name),
            body: error_message.to_string(),
            attachment: None,
            dedup_key: Self::step_dedup_key(step_name, AlertKind::StepFailed),
        }
    }

    pub fn step_completed(step_name: &str) -> Self {
        Self {
            kind: AlertKind::StepCompleted,
            subject: format!("Step {} completed", step_name),
            body: format!("Step {} finished successfully.", step_name),
            attachment: None,
            dedup_key: Self::step_dedup_key(step_name, AlertKind::StepCompleted),
        }
    }

    pub fn startup_notice(date: chrono::NaiveDate) -> Self {
        Self {
            kind: AlertKind::StartupNotice,
            subject: "Pipeline orchestrator started".to_string(),
            body: format!("Orchestrator started for {}", date),
            attachment: None,
            dedup_key: format!("startup:{}", date),
        }
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
