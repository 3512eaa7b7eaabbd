// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized path resolution. No component other than this module
//! constructs a dated folder path by string concatenation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Render a date in the lowercase `DDmon` folder-naming convention the job
/// executables also use (e.g. `2026-07-31` -> `31jul`). Part of the
/// contract in spec §6.2 — job executables derive the same string from
/// `PIPELINE_DATE`.
pub fn date_folder(date: NaiveDate) -> String {
    format!("{:02}{}", date.format("%d"), date.format("%b").to_string().to_lowercase())
}

/// A logical output directory an `ArtifactCheck` (step.rs) can name,
/// resolved through `Paths` rather than by string concatenation (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactDir {
    Csv,
    Merged,
    Pdf,
}

/// All filesystem locations the orchestrator reads from or writes to,
/// resolved from a single `root_dir`. Every other component asks `Paths`
/// rather than joining strings itself.
#[derive(Debug, Clone)]
pub struct Paths {
    pub root_dir: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Paths {
    pub fn new(root_dir: PathBuf, state_dir: PathBuf, log_dir: PathBuf) -> Self {
        Self {
            root_dir,
            state_dir,
            log_dir,
        }
    }

    pub fn csv_dir(&self, date: NaiveDate) -> PathBuf {
        self.root_dir.join("csv").join(date_folder(date))
    }

    pub fn merged_dir(&self, date: NaiveDate) -> PathBuf {
        self.root_dir.join("merged").join(date_folder(date))
    }

    pub fn pdf_dir(&self, date: NaiveDate) -> PathBuf {
        self.root_dir.join("pdf").join(date_folder(date))
    }

    pub fn log_dir(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(date_folder(date))
    }

    pub fn current_journal_path(&self) -> PathBuf {
        self.state_dir.join("current.json")
    }

    pub fn journal_path_for_date(&self, date: NaiveDate) -> PathBuf {
        self.state_dir
            .join(format!("journal-{}.json", date.format("%Y-%m-%d")))
    }

    pub fn instance_lock_path(&self) -> PathBuf {
        self.state_dir.join("instance.lock")
    }

    /// Resolve an [`ArtifactDir`] for a given date through the matching
    /// accessor above, so callers never reassemble the path themselves.
    pub fn artifact_dir(&self, dir: ArtifactDir, date: NaiveDate) -> PathBuf {
        match dir {
            ArtifactDir::Csv => self.csv_dir(date),
            ArtifactDir::Merged => self.merged_dir(date),
            ArtifactDir::Pdf => self.pdf_dir(date),
        }
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
