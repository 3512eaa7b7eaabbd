// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `--status`: a human-readable rendering of `current.json`, independent
//! of the Pipeline Engine so it works even while another instance holds
//! the lock and is actively mutating the journal underneath it.

use dayorch_core::DailyJournal;
use std::fmt::Write as _;

/// Render a one-line-per-step summary plus alert counts, in declared
/// journal order (the `BTreeMap` underneath sorts by name, which is
/// deterministic and good enough for an operator glance).
pub fn render_status(journal: &DailyJournal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "date: {}", journal.date);
    for (name, state) in &journal.steps {
        let _ = write!(out, "  {name}: {}", state.status);
        if state.attempts_today > 0 {
            let _ = write!(out, " (attempts={})", state.attempts_today);
        }
        if let Some(code) = state.last_exit_code {
            let _ = write!(out, " exit={code}");
        }
        if let Some(msg) = &state.last_error_message {
            let _ = write!(out, " error={msg:?}");
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "alerts_sent: {}", journal.alerts_sent.len());
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
