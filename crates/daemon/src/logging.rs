// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup for the orchestrator log (distinct from per-step log
//! files, which the Job Runner writes directly under `log_dir`).
//!
//! Log-rotation plumbing is explicitly out of scope (§1): the appender
//! never rotates or truncates on its own, mirroring how the job
//! executables' own logs are left to the host's ops tooling.

use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ORCHESTRATOR_LOG_FILE: &str = "dayorch.log";

/// Install a non-blocking file-writing subscriber rooted at `log_dir`.
/// The returned guard must be held for the process lifetime; dropping it
/// stops the background flush worker.
pub fn setup_logging(
    log_dir: &Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, ORCHESTRATOR_LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
