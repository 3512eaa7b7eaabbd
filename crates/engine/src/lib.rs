// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dayorch-engine: the Pipeline Engine (C8) — the daily DAG state
//! machine described in spec §4.8. Composes `dayorch-core`'s pure
//! Clock/Window/Journal types with `dayorch-storage`'s durable Journal
//! persistence and `dayorch-adapters`'s I/O boundaries (Job Runner,
//! Artifact Probe, Notifier, Process Hygiene) into a single `tick(now)`
//! entry point the Supervisor Loop drives on a cadence.

mod backoff;
mod pipeline;

pub use backoff::{backoff_delay, jittered, MAX_BACKOFF, MIN_BACKOFF};
pub use pipeline::{PipelineEngine, PipelineError, TickReport};
