// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step definitions: the static, config-derived description of a node in
//! the daily DAG. See [`crate::step_state`] for the per-day runtime state
//! that tracks a step's progress.

use crate::paths::ArtifactDir;
use crate::window::Window;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

crate::define_id! {
    /// Unique name of a step in the daily DAG, e.g. `dl_am` or `merge`.
    pub struct StepName;
}

/// How a step becomes eligible to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Eligible only inside its declared `windows`.
    WindowedJob,
    /// Always eligible once the day starts; fires at most once per day.
    Unconditional,
    /// Has no window of its own; becomes eligible the first tick after its
    /// dependencies are all `Done`.
    DependencyGated,
}

/// An optional post-success check that demotes an exit-0 run to a failure
/// unless the expected artifact shows up. Expressed declaratively so the
/// Pipeline Engine can evaluate it without depending on `dayorch-adapters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCheck {
    /// Logical output directory the check runs against, resolved through
    /// `Paths::artifact_dir` (§4.2) rather than named as a raw subpath.
    pub dir: ArtifactDir,
    /// Glob pattern files must match (e.g. `*.csv`).
    pub glob: String,
    /// Minimum number of matching files required.
    #[serde(default = "ArtifactCheck::default_min_count")]
    pub min_count: u32,
    /// Minimum size, in bytes, each matching file must have.
    #[serde(default)]
    pub min_size_bytes: u64,
    /// If non-zero, the file's size must be stable across two samples this
    /// many milliseconds apart (defends against counting half-written files).
    #[serde(default)]
    pub min_age_millis: u64,
}

impl ArtifactCheck {
    fn default_min_count() -> u32 {
        1
    }
}

/// The static, config-derived definition of one node in the daily DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDef {
    pub name: StepName,
    pub kind: StepKind,
    #[serde(default)]
    pub windows: Vec<Window>,
    #[serde(default)]
    pub dependencies: BTreeSet<StepName>,
    pub executable: PathBuf,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(with = "humantime_serde_duration")]
    pub timeout: Duration,
    #[serde(default = "StepDef::default_max_attempts")]
    pub max_attempts_per_window: u32,
    /// Empty means "every day".
    #[serde(default)]
    pub required_days_of_week: BTreeSet<Weekday>,
    #[serde(default)]
    pub post_success_artifact_check: Option<ArtifactCheck>,
    /// Run after the last window has elapsed if the step hasn't succeeded yet today.
    #[serde(default)]
    pub catch_up: bool,
    /// Run Process Hygiene's `terminate_family` immediately after this step exits.
    #[serde(default)]
    pub closes_application_on_exit: bool,
}

impl StepDef {
    fn default_max_attempts() -> u32 {
        1
    }

    /// Whether `other` is a direct dependency of this step.
    pub fn depends_on(&self, other: &StepName) -> bool {
        self.dependencies.contains(other)
    }
}

/// Serde helper: (de)serialize a `Duration` from strings like `30s`, `5m`, `1h`.
mod humantime_serde_duration {
    use super::Duration;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        crate::duration::format_duration(*d).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        crate::duration::parse_duration(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
