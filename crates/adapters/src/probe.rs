// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact Probe (C2): filesystem predicates the Pipeline Engine uses to
//! decide whether a step's expected output actually showed up.
//!
//! Every predicate is pure given a fixed `now` — callers always pass an
//! explicit instant rather than letting this module read the clock. I/O
//! errors are logged and treated as "unknown"; by default the caller
//! reads that as "not satisfied" rather than failing closed.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

/// A file matched by a glob, with the metadata callers most often need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    pub path: PathBuf,
    pub mtime: SystemTime,
    pub size: u64,
}

#[derive(Default, Clone, Copy)]
pub struct ArtifactProbe;

impl ArtifactProbe {
    pub fn new() -> Self {
        Self
    }

    /// Count files in `folder` matching `glob_pattern` whose size is at
    /// least `min_size_bytes`. If `min_age_millis` is non-zero, a file only
    /// counts if two size samples taken `min_age_millis` apart agree,
    /// which defends against counting a file that's still being written.
    pub async fn count_files(
        &self,
        folder: &Path,
        glob_pattern: &str,
        min_size_bytes: u64,
        min_age_millis: u64,
    ) -> i64 {
        let matches = self.list_matching(folder, glob_pattern);
        let mut count = 0i64;
        for path in matches {
            let Some(first) = file_size(&path) else {
                continue;
            };
            if first < min_size_bytes {
                continue;
            }
            if min_age_millis > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(min_age_millis)).await;
                match file_size(&path) {
                    Some(second) if second == first => {}
                    _ => continue,
                }
            }
            count += 1;
        }
        count
    }

    /// Whether at least one file in `folder` matches `glob_pattern`.
    pub fn exists_any(&self, folder: &Path, glob_pattern: &str) -> bool {
        !self.list_matching(folder, glob_pattern).is_empty()
    }

    /// The most recently modified file in `folder` matching `glob_pattern`.
    pub fn newest_matching(&self, folder: &Path, glob_pattern: &str) -> Option<MatchedFile> {
        self.list_matching(folder, glob_pattern)
            .into_iter()
            .filter_map(|path| {
                let metadata = std::fs::metadata(&path).ok()?;
                let mtime = metadata.modified().ok()?;
                Some(MatchedFile {
                    path,
                    mtime,
                    size: metadata.len(),
                })
            })
            .max_by_key(|f| f.mtime)
    }

    fn list_matching(&self, folder: &Path, glob_pattern: &str) -> Vec<PathBuf> {
        if !folder.exists() {
            return Vec::new();
        }
        let pattern = folder.join(glob_pattern);
        let pattern_str = pattern.to_string_lossy().into_owned();
        match glob::glob(&pattern_str) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(error = %e, pattern = %pattern_str, "glob entry read failed");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, pattern = %pattern_str, "invalid glob pattern");
                Vec::new()
            }
        }
    }
}

fn file_size(path: &Path) -> Option<u64> {
    match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.len()),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "artifact probe stat failed");
            None
        }
    }
}

/// Format a [`SystemTime`] as a local timestamp for journal/alert display.
pub fn format_mtime(mtime: SystemTime) -> String {
    DateTime::<Local>::from(mtime).to_rfc3339()
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
