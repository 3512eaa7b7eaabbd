// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process Hygiene (C7): keeps the legacy target application from
//! lingering between steps or across days.
//!
//! `terminate_family` is best-effort: it asks matching processes to close,
//! waits a grace period, then force-kills whoever is still alive. There is
//! no way to distinguish "the app quit on its own" from "our close signal
//! worked" from here, and neither matters to the caller.

use std::time::Duration;
use sysinfo::{Pid, System};
use tracing::{info, warn};

/// Matches running processes against the configured legacy-application
/// name patterns and terminates them.
pub struct ProcessHygiene {
    patterns: Vec<glob::Pattern>,
    grace: Duration,
}

impl ProcessHygiene {
    /// `patterns` are process-name globs (e.g. `LegacyApp*.exe`); invalid
    /// patterns are logged and dropped rather than rejected at startup,
    /// since hygiene is advisory and must never block the Supervisor.
    pub fn new(patterns: &[String], grace: Duration) -> Self {
        let compiled = patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "invalid process hygiene pattern, ignoring");
                    None
                }
            })
            .collect();
        Self {
            patterns: compiled,
            grace,
        }
    }

    /// Terminate every running process whose name matches a configured
    /// pattern: request a graceful close, wait `grace`, then kill whatever
    /// remains. `reason` is only used for logging.
    pub async fn terminate_family(&self, reason: &str) {
        let mut system = System::new();
        system.refresh_processes();

        let matched: Vec<Pid> = system
            .processes()
            .iter()
            .filter(|(_, process)| self.matches(process.name()))
            .map(|(pid, _)| *pid)
            .collect();

        if matched.is_empty() {
            return;
        }

        info!(count = matched.len(), reason, "requesting graceful close");
        for pid in &matched {
            if let Some(process) = system.process(*pid) {
                let _ = process.kill_with(sysinfo::Signal::Term);
            }
        }

        tokio::time::sleep(self.grace).await;

        system.refresh_processes();
        let survivors: Vec<Pid> = matched
            .into_iter()
            .filter(|pid| system.process(*pid).is_some())
            .collect();

        if survivors.is_empty() {
            return;
        }

        warn!(count = survivors.len(), reason, "force-killing survivors");
        for pid in survivors {
            if let Some(process) = system.process(pid) {
                process.kill();
            }
        }
    }

    fn matches(&self, process_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(process_name))
    }
}

#[cfg(test)]
#[path = "hygiene_tests.rs"]
mod tests;
