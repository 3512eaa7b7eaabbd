// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic persistence of the Daily Journal (C4: State Store).
//!
//! Every mutator writes the entire Journal atomically: tempfile in the
//! same directory, `sync_all`, then `rename` over the target — the exact
//! sequence this codebase family already uses for its snapshot files.

use chrono::NaiveDate;
use dayorch_core::{DailyJournal, Paths, StepDef};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
/// Keeps up to [`MAX_BAK_FILES`] backups; the oldest is dropped.
pub fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Owns the on-disk Journal at `<state_dir>/current.json`, plus prior
/// days' renamed copies. The State Store is the only component that
/// writes the Journal; other components read through `JournalStore`'s
/// accessors or a loaded `DailyJournal` directly.
pub struct JournalStore {
    paths: Paths,
}

impl JournalStore {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    /// Load today's Journal at startup, creating one if missing. If a
    /// Journal for today already exists (process restarted mid-day), it
    /// is adopted as-is — this is how restart-resilience is achieved.
    /// A corrupt `current.json` is rotated to `.bak` and a fresh Journal
    /// is started rather than crash-looping the daemon for a year.
    pub fn load_or_create(
        &self,
        today: NaiveDate,
        steps: &[StepDef],
    ) -> Result<DailyJournal, StorageError> {
        let path = self.paths.current_journal_path();
        if !path.exists() {
            let journal = DailyJournal::new_for_date(today, steps);
            self.save(&journal)?;
            return Ok(journal);
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, DailyJournal>(reader) {
            Ok(journal) if journal.date == today => Ok(journal),
            Ok(stale) => {
                // Found a Journal from a previous day: the Supervisor should
                // have rolled it over before calling this, but guard anyway.
                warn!(
                    stale_date = %stale.date,
                    today = %today,
                    "current.json is stale, starting a fresh journal for today",
                );
                let journal = DailyJournal::new_for_date(today, steps);
                self.save(&journal)?;
                Ok(journal)
            }
            Err(e) => {
                let bak_path = rotate_bak_path(&path);
                warn!(
                    error = %e,
                    path = %path.display(),
                    bak = %bak_path.display(),
                    "corrupt journal, moving to .bak and starting fresh",
                );
                fs::rename(&path, &bak_path)?;
                let journal = DailyJournal::new_for_date(today, steps);
                self.save(&journal)?;
                Ok(journal)
            }
        }
    }

    /// Write the entire Journal atomically (write to tempfile in the same
    /// directory, fsync, rename over target) to guarantee crash safety.
    pub fn save(&self, journal: &DailyJournal) -> Result<(), StorageError> {
        let path = self.paths.current_journal_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, journal)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Rollover procedure (§4.4), triggered by the Supervisor when
    /// `local_date(now) != journal.date`:
    ///
    /// 1. Write a final snapshot of the outgoing Journal.
    /// 2. Rename `current.json` to `journal-<old-date>.json`, tolerating a
    ///    pre-existing file by suffixing `.bak-<seq>`.
    /// 3. Construct a fresh Journal for the new date.
    /// 4. Write the new Journal.
    ///
    /// Atomic from an observer's perspective: either the new Journal
    /// exists and the old one has been renamed, or neither change has
    /// occurred (invariant 5 / 8.4).
    pub fn rollover(
        &self,
        outgoing: &DailyJournal,
        new_date: NaiveDate,
        steps: &[StepDef],
    ) -> Result<DailyJournal, StorageError> {
        self.save(outgoing)?;

        let current_path = self.paths.current_journal_path();
        let mut archive_path = self.paths.journal_path_for_date(outgoing.date);
        let mut seq = 2;
        while archive_path.exists() {
            archive_path = self
                .paths
                .state_dir
                .join(format!("journal-{}.bak-{}.json", outgoing.date, seq));
            seq += 1;
        }
        fs::rename(&current_path, &archive_path)?;

        let fresh = DailyJournal::new_for_date(new_date, steps);
        self.save(&fresh)?;
        Ok(fresh)
    }
}

#[cfg(test)]
#[path = "journal_store_tests.rs"]
mod tests;
