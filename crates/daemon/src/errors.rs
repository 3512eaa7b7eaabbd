// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor-level errors, each mapped to one of the exit codes in §6.5:
//! 0 normal, 2 config invalid, 3 lock held by peer, 4 state dir
//! unwritable, 1 otherwise.

use dayorch_core::ConfigError;
use dayorch_storage::{LockError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("configuration invalid: {0:?}")]
    Invalid(Vec<ConfigError>),

    #[error("instance lock error: {0}")]
    Lock(#[from] LockError),

    #[error("state_dir '{0}' is not writable")]
    UnwritableStateDir(std::path::PathBuf),

    #[error("journal storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("pipeline engine error: {0}")]
    Pipeline(#[from] dayorch_engine::PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupervisorError {
    /// Process exit code per §6.5/§7.
    pub fn exit_code(&self) -> i32 {
        match self {
            SupervisorError::Config(_) | SupervisorError::Invalid(_) => 2,
            SupervisorError::Lock(LockError::HeldByPeer { .. }) => 3,
            SupervisorError::UnwritableStateDir(_) => 4,
            _ => 1,
        }
    }
}
