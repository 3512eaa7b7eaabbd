// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal schema migration for schema evolution.
//!
//! A 365-day-unattended deployment must survive in-place binary upgrades:
//! a Journal written by an older binary is upgraded before it's trusted.
//! Migrations transform Journal JSON from one `schema_version` to the
//! next; the registry chains migrations to reach the current version.

use dayorch_core::JOURNAL_SCHEMA_VERSION;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration v{from}->v{to} failed: {reason}")]
    Failed { from: u32, to: u32, reason: String },
    #[error("no migration path from v{0} to v{1}")]
    NoPath(u32, u32),
    #[error("journal schema version {0} is newer than supported ({1})")]
    TooNew(u32, u32),
}

/// A migration from one Journal schema version to the next.
pub trait JournalMigration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, journal: &mut Value) -> Result<(), MigrationError>;
}

/// Registry of migrations for upgrading on-disk journals.
pub struct JournalMigrationRegistry {
    migrations: Vec<Box<dyn JournalMigration>>,
}

impl JournalMigrationRegistry {
    /// Registry with all known migrations. Empty today: schema version 1
    /// is the only version that has ever shipped. New migrations get
    /// pushed here as the schema evolves.
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// Migrate a Journal JSON value up to `target`, in place logically
    /// (returns the migrated value).
    pub fn migrate_to(&self, mut journal: Value, target: u32) -> Result<Value, MigrationError> {
        let current = journal
            .get("schema_version")
            .and_then(|v| v.as_u64())
            .unwrap_or(1) as u32;

        if current == target {
            return Ok(journal);
        }
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }

        let mut version = current;
        while version < target {
            let migration = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(version, target))?;

            migration.migrate(&mut journal)?;
            version = migration.target_version();

            if let Some(obj) = journal.as_object_mut() {
                obj.insert("schema_version".into(), version.into());
            }
        }
        Ok(journal)
    }

    /// Convenience: migrate to the current compiled-in schema version.
    pub fn migrate_to_current(&self, journal: Value) -> Result<Value, MigrationError> {
        self.migrate_to(journal, JOURNAL_SCHEMA_VERSION)
    }
}

impl Default for JournalMigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "journal_migration_tests.rs"]
mod tests;
