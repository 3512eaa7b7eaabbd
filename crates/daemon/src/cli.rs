// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface (§6.5): a default invocation runs the Supervisor
//! until signalled; the remaining flags are one-shot operations that
//! exit without starting the tick loop.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dayorchd",
    version,
    about = "Daily pipeline orchestrator daemon"
)]
pub struct Cli {
    /// Path to the TOML configuration document (§6.1).
    #[arg(long, env = "DAYORCH_CONFIG", default_value = "/etc/dayorch/config.toml")]
    pub config: PathBuf,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    pub validate: bool,

    /// Print a human-readable summary of today's journal, then exit.
    #[arg(long)]
    pub status: bool,

    /// Delete today's journal. Testing aid only; refuses if another
    /// instance holds the instance lock.
    #[arg(long = "reset-today")]
    pub reset_today: bool,
}
