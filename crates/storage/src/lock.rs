// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance guard (C5: Lock Manager).
//!
//! Uses `fs2::FileExt::try_lock_exclusive` on a PID file, the same
//! mechanism this codebase family's daemon startup uses. Supplemented
//! with the documented PID/program-identity staleness check: if the OS
//! advisory lock is held by a process that no longer exists, or exists
//! but is a different program, the lock is stale and reclaimed.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use sysinfo::{Pid, System};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("instance lock is held by a live peer (pid {pid}, host {host})")]
    HeldByPeer { pid: u32, host: String },
}

/// Contents of `state/instance.lock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    started_at: chrono::DateTime<chrono::Local>,
    host: String,
    /// Program identity (executable file name), used to distinguish a
    /// reused PID belonging to an unrelated process from a genuine peer.
    program: String,
}

/// A held instance lock. Dropping or calling [`InstanceLock::release`]
/// removes the lock file; the OS releases the advisory flock on process
/// exit regardless, so a crash also self-heals on the next start.
pub struct InstanceLock {
    path: PathBuf,
    file: File,
}

impl InstanceLock {
    /// Attempt to create and exclusively lock `path`. On conflict, checks
    /// whether the named PID is live and is the same program; if not, the
    /// lock is stale and is reclaimed (deleted and retried once). If the
    /// lock is held by a live peer, returns [`LockError::HeldByPeer`].
    pub fn acquire(path: &Path, now: chrono::DateTime<chrono::Local>) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match Self::try_acquire_once(path, now) {
            Ok(lock) => Ok(lock),
            Err(LockError::HeldByPeer { pid, host }) => {
                if Self::is_stale(path, pid) {
                    let _ = std::fs::remove_file(path);
                    Self::try_acquire_once(path, now)
                } else {
                    Err(LockError::HeldByPeer { pid, host })
                }
            }
            Err(e) => Err(e),
        }
    }

    fn try_acquire_once(
        path: &Path,
        now: chrono::DateTime<chrono::Local>,
    ) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            let mut contents = String::new();
            let mut reader = &file;
            let _ = reader.read_to_string(&mut contents);
            if let Ok(info) = serde_json::from_str::<LockInfo>(&contents) {
                return Err(LockError::HeldByPeer {
                    pid: info.pid,
                    host: info.host,
                });
            }
            return Err(LockError::HeldByPeer {
                pid: 0,
                host: "unknown".to_string(),
            });
        }

        // Only write PID-file contents now that we hold the lock, so a
        // losing racer never truncates a live daemon's lock file.
        let info = LockInfo {
            pid: std::process::id(),
            started_at: now,
            host: hostname(),
            program: current_program_name(),
        };
        let mut file = file;
        file.set_len(0)?;
        use std::io::Seek;
        file.seek(std::io::SeekFrom::Start(0))?;
        file.write_all(serde_json::to_string(&info)?.as_bytes())?;
        file.sync_all()?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Whether the lock at `path` (held by `recorded_pid`) belongs to a
    /// process that is no longer alive, or is alive but a different
    /// program than ours.
    fn is_stale(path: &Path, recorded_pid: u32) -> bool {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return true,
        };
        let info: LockInfo = match serde_json::from_str(&contents) {
            Ok(i) => i,
            Err(_) => return true,
        };
        debug_assert_eq!(info.pid, recorded_pid);

        let mut system = System::new();
        system.refresh_processes();
        match system.process(Pid::from(info.pid as usize)) {
            None => true,
            Some(process) => process.name() != info.program,
        }
    }

    /// Release the lock: remove the lock file. The advisory flock is
    /// released implicitly when `file` is dropped.
    pub fn release(self) -> Result<(), LockError> {
        std::fs::remove_file(&self.path)?;
        Ok(())
    }
}

impl From<serde_json::Error> for LockError {
    fn from(e: serde_json::Error) -> Self {
        LockError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string())
}

fn current_program_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "dayorchd".to_string())
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
