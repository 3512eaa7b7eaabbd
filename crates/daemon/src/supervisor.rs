// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor Loop (C9): configuration load, instance lock, tick
//! cadence, graceful shutdown, midnight rollover. The daemon's only
//! long-running task; everything else in this crate is a one-shot
//! operation invoked from `main`.

use crate::errors::SupervisorError;
use chrono::{DateTime, Local};
use dayorch_adapters::{ArtifactProbe, JobRunner, NotifyAdapter, ProcessHygiene};
use dayorch_core::{Config, ConfigError, DailyJournal, Paths};
use dayorch_engine::PipelineEngine;
use dayorch_storage::{InstanceLock, JournalStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{info, warn};

/// Reject a config whose validation failed, mapping an unwritable
/// `state_dir` to its own exit code (§6.5/§7) even though
/// [`Config::validate`] reports it alongside ordinary validation errors.
fn check_validated(config: &Config) -> Result<(), SupervisorError> {
    if let Err(errors) = config.validate() {
        if errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnwritableStateDir(_)))
        {
            return Err(SupervisorError::UnwritableStateDir(config.state_dir.clone()));
        }
        return Err(SupervisorError::Invalid(errors));
    }
    Ok(())
}

/// Load and validate the configuration at `path`, without acquiring the
/// instance lock or touching the journal. Used by `--validate`.
pub fn load_and_validate(path: &Path) -> Result<Config, SupervisorError> {
    let config = Config::load(path)?;
    check_validated(&config)?;
    Ok(config)
}

fn paths_of(config: &Config) -> Paths {
    Paths::new(
        config.root_dir.clone(),
        config.state_dir.clone(),
        config.log_dir.clone(),
    )
}

/// `--status`: read `current.json` without acquiring the instance lock,
/// so it works alongside a running instance.
pub fn read_status(config: &Config) -> Result<String, SupervisorError> {
    let paths = paths_of(config);
    let path = paths.current_journal_path();
    let content = std::fs::read_to_string(&path)?;
    let journal: DailyJournal = serde_json::from_str(&content)
        .map_err(dayorch_storage::StorageError::from)?;
    Ok(crate::status::render_status(&journal))
}

/// `--reset-today`: delete today's journal. Refuses if another instance
/// holds the lock (acquiring it ourselves first, then releasing it,
/// doubles as that check).
pub fn reset_today(config: &Config) -> Result<(), SupervisorError> {
    let paths = paths_of(config);
    let now = Local::now();
    let lock = InstanceLock::acquire(&paths.instance_lock_path(), now)?;
    let path = paths.current_journal_path();
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    lock.release()?;
    Ok(())
}

/// The Supervisor Loop. Generic over the Notifier so production code
/// wires in `MailerNotifyAdapter` while tests use `FakeNotifyAdapter`.
pub struct Supervisor<N: NotifyAdapter> {
    config: Config,
    paths: Paths,
    probe: ArtifactProbe,
    runner: Arc<JobRunner>,
    hygiene: Arc<ProcessHygiene>,
    notifier: N,
    wake: Arc<Notify>,
    lock: Option<InstanceLock>,
    engine: PipelineEngine<N>,
}

impl<N: NotifyAdapter> Supervisor<N> {
    /// Parse and validate `config`, acquire the instance lock, load or
    /// create today's journal, and reconcile any step left `Running` by a
    /// predecessor that crashed (§8 E3).
    pub async fn start(config: Config, notifier: N) -> Result<Self, SupervisorError> {
        check_validated(&config)?;

        let paths = paths_of(&config);
        let now = Local::now();
        let lock = InstanceLock::acquire(&paths.instance_lock_path(), now)?;

        let journal_store = JournalStore::new(paths.clone());
        let journal = journal_store.load_or_create(now.date_naive(), &config.steps)?;

        let probe = ArtifactProbe::new();
        let runner = Arc::new(JobRunner::new(paths.root_dir.clone()));
        let hygiene = Arc::new(ProcessHygiene::new(
            &config.process_hygiene.patterns,
            config.process_hygiene.grace_period,
        ));
        let wake = Arc::new(Notify::new());

        let mut engine = PipelineEngine::new(
            config.clone(),
            paths.clone(),
            journal,
            journal_store,
            probe,
            Arc::clone(&runner),
            Arc::clone(&hygiene),
            notifier.clone(),
            Arc::clone(&wake),
        );
        engine.reconcile_orphaned_running(now).await?;
        engine.raise_startup_notice().await?;

        Ok(Self {
            config,
            paths,
            probe,
            runner,
            hygiene,
            notifier,
            wake,
            lock: Some(lock),
            engine,
        })
    }

    /// Run the tick loop until SIGTERM, SIGINT, or an unrecoverable
    /// error, then shut down gracefully.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.wake.notified() => {}
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    info!("received SIGINT, shutting down");
                    break;
                }
            }

            let now = Local::now();
            self.maybe_rollover(now)?;
            let report = self.engine.tick(now).await?;
            if !report.started.is_empty() || !report.done.is_empty() || !report.failed.is_empty() {
                info!(
                    started = ?report.started,
                    done = ?report.done,
                    failed = ?report.failed,
                    skipped = ?report.skipped,
                    "tick"
                );
            }
        }

        self.shutdown().await
    }

    /// If local midnight has passed relative to the held journal, roll
    /// over: snapshot and archive the outgoing day, seed a fresh one, and
    /// rebuild the engine around it.
    fn maybe_rollover(&mut self, now: DateTime<Local>) -> Result<(), SupervisorError> {
        let today = now.date_naive();
        if self.engine.journal().date == today {
            return Ok(());
        }
        info!(from = %self.engine.journal().date, to = %today, "rolling over to a new day");
        let journal_store = JournalStore::new(self.paths.clone());
        let fresh = journal_store.rollover(self.engine.journal(), today, &self.config.steps)?;
        self.engine = PipelineEngine::new(
            self.config.clone(),
            self.paths.clone(),
            fresh,
            JournalStore::new(self.paths.clone()),
            self.probe,
            Arc::clone(&self.runner),
            Arc::clone(&self.hygiene),
            self.notifier.clone(),
            Arc::clone(&self.wake),
        );
        Ok(())
    }

    /// Stop accepting new ticks (the caller has already broken its loop),
    /// give in-flight runs a grace period to finish, optionally clean up
    /// the legacy application, persist the journal, and release the lock.
    ///
    /// Steps still running past the grace period are not force-killed
    /// individually — the process exit itself reaps them via
    /// `kill_on_drop` on their child handles, which does not walk the
    /// full process tree the way a timeout-triggered kill does. See
    /// DESIGN.md for why this is an acceptable simplification.
    async fn shutdown(mut self) -> Result<(), SupervisorError> {
        if self.config.cleanup_on_exit {
            self.hygiene.terminate_family("supervisor_shutdown").await;
        }

        let grace = self.config.process_hygiene.grace_period.max(Duration::from_secs(1));
        let deadline = std::time::Instant::now() + grace;
        while self.engine.running_count() > 0 && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if self.engine.running_count() > 0 {
            warn!(
                running = self.engine.running_count(),
                "shutdown grace period elapsed with steps still running"
            );
        }

        if let Some(lock) = self.lock.take() {
            lock.release()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
