// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline Engine (C8): composes the Clock, Artifact Probe, Job Runner,
//! State Store, Notifier and Process Hygiene into the daily DAG state
//! machine described in spec §4.8. The only public entry point is
//! [`PipelineEngine::tick`], invoked by the Supervisor Loop on a cadence.
//!
//! `tick` never waits on a child process: starting a step spawns a
//! background task that reports back on an internal channel, and
//! completions already sitting in that channel are applied at the top of
//! the next `tick` before any new step is considered. A `tokio::sync::
//! Notify` is signalled when a background task finishes, so the
//! Supervisor can re-tick immediately instead of waiting for the next
//! cadence.

use chrono::{DateTime, Local};
use dayorch_adapters::{ArtifactProbe, JobRunner, NotifyAdapter, ProcessHygiene, RunResult};
use dayorch_core::{date_folder, window, Alert, ArtifactCheck, Config, DailyJournal, Paths, StepDef};
use dayorch_storage::{JournalStore, StorageError};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("journal storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("step {0:?} missing from today's journal despite being configured")]
    StepNotSeeded(String),
}

/// Result of running one attempt of a step, delivered back to the engine
/// on its completion channel.
struct StepOutcome {
    step: String,
    attempt_no: u32,
    result: std::io::Result<RunResult>,
}

/// Summary of what a single `tick` did, for logging and tests.
#[derive(Debug, Default, Clone)]
pub struct TickReport {
    pub started: Vec<String>,
    pub done: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
}

/// The Pipeline Engine: the daily DAG state machine (C8). Generic over
/// the Notifier so production code uses `MailerNotifyAdapter` and tests
/// use `FakeNotifyAdapter`, the same shape every adapter trait in this
/// workspace follows.
pub struct PipelineEngine<N: NotifyAdapter> {
    config: Config,
    paths: Paths,
    journal: DailyJournal,
    journal_store: JournalStore,
    probe: ArtifactProbe,
    runner: Arc<JobRunner>,
    hygiene: Arc<ProcessHygiene>,
    notifier: N,
    wake: Arc<Notify>,
    running: HashSet<String>,
    outcomes_tx: mpsc::UnboundedSender<StepOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<StepOutcome>,
}

impl<N: NotifyAdapter> PipelineEngine<N> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        paths: Paths,
        journal: DailyJournal,
        journal_store: JournalStore,
        probe: ArtifactProbe,
        runner: Arc<JobRunner>,
        hygiene: Arc<ProcessHygiene>,
        notifier: N,
        wake: Arc<Notify>,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            config,
            paths,
            journal,
            journal_store,
            probe,
            runner,
            hygiene,
            notifier,
            wake,
            running: HashSet::new(),
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn journal(&self) -> &DailyJournal {
        &self.journal
    }

    /// Whether every step has reached a terminal state for the day.
    pub fn day_settled(&self) -> bool {
        self.journal.all_steps_settled()
    }

    /// Number of steps with a background task currently in flight. Used
    /// by the Supervisor to bound how long graceful shutdown waits
    /// before the process exits out from under them.
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// At startup, any step found `Running` belongs to a predecessor
    /// process that is gone (crash/kill). Per spec §8/E3, such a step is
    /// treated as `Failed` with reason `orphaned`, then retried within
    /// its remaining window like any other failure.
    pub async fn reconcile_orphaned_running(
        &mut self,
        now: DateTime<Local>,
    ) -> Result<(), PipelineError> {
        let orphaned: Vec<StepDef> = self
            .config
            .steps
            .iter()
            .filter(|s| {
                self.journal
                    .step(s.name.as_str())
                    .map(|st| st.status == dayorch_core::StepStatus::Running)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        for step in orphaned {
            warn!(step = %step.name, "found Running step at startup, treating as orphaned");
            self.handle_failure(now, &step, "orphaned".to_string(), None, false)
                .await?;
        }
        Ok(())
    }

    /// Drive one tick of the daily DAG at `now`. Applies any completions
    /// already on the channel, then starts every step that is eligible,
    /// has its dependencies met, and isn't already running, up to
    /// `global_parallelism` concurrent runs.
    pub async fn tick(&mut self, now: DateTime<Local>) -> Result<TickReport, PipelineError> {
        let mut report = TickReport::default();

        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.apply_outcome(now, outcome, &mut report).await?;
        }

        let steps = self.config.steps.clone();
        let cap = self.config.global_parallelism.max(1) as usize;

        for step in &steps {
            let name = step.name.as_str().to_string();
            let Some(state) = self.journal.step(&name).cloned() else {
                continue;
            };

            if state.status.is_terminal_for_day()
                || state.status == dayorch_core::StepStatus::Running
                || state.status == dayorch_core::StepStatus::Failed
            {
                continue;
            }

            if self.any_dependency_unavailable(step) {
                if let Some(s) = self.journal.step_mut(&name) {
                    s.mark_skipped();
                }
                info!(step = %name, "dependency failed or skipped, skipping");
                report.skipped.push(name.clone());
                self.journal_store.save(&self.journal)?;
                continue;
            }

            if !self.all_dependencies_done(step) {
                continue;
            }

            let eval = window::evaluate(&step.windows, &step.required_days_of_week, now);
            let should_run = match eval {
                window::WindowEvaluation::NotToday => {
                    if let Some(s) = self.journal.step_mut(&name) {
                        s.mark_skipped();
                    }
                    report.skipped.push(name.clone());
                    self.journal_store.save(&self.journal)?;
                    false
                }
                window::WindowEvaluation::NotYet => false,
                window::WindowEvaluation::InWindow => true,
                window::WindowEvaluation::Missed => {
                    if step.catch_up {
                        true
                    } else {
                        if let Some(s) = self.journal.step_mut(&name) {
                            s.mark_skipped();
                        }
                        report.skipped.push(name.clone());
                        self.journal_store.save(&self.journal)?;
                        false
                    }
                }
            };
            if !should_run {
                continue;
            }

            if let Some(not_before) = state.retry_not_before {
                if now < not_before {
                    continue;
                }
            }

            if self.running.len() >= cap {
                continue;
            }

            self.start_step(now, step)?;
            report.started.push(name);
        }

        self.maybe_raise_heartbeat(now).await?;
        self.maybe_raise_daily_report(now).await?;

        Ok(report)
    }

    fn any_dependency_unavailable(&self, step: &StepDef) -> bool {
        step.dependencies.iter().any(|dep| {
            matches!(
                self.journal.step(dep.as_str()).map(|s| s.status),
                Some(dayorch_core::StepStatus::Failed) | Some(dayorch_core::StepStatus::Skipped)
            )
        })
    }

    fn all_dependencies_done(&self, step: &StepDef) -> bool {
        step.dependencies.iter().all(|dep| {
            matches!(
                self.journal.step(dep.as_str()).map(|s| s.status),
                Some(dayorch_core::StepStatus::Done)
            )
        })
    }

    fn start_step(&mut self, now: DateTime<Local>, step: &StepDef) -> Result<(), PipelineError> {
        let name = step.name.as_str().to_string();
        let attempt_no = {
            let state = self
                .journal
                .step_mut(&name)
                .ok_or_else(|| PipelineError::StepNotSeeded(name.clone()))?;
            state.mark_started(now);
            state.attempts_today
        };
        self.journal_store.save(&self.journal)?;
        self.running.insert(name.clone());

        let is_hygiene_trigger = self
            .config
            .process_hygiene
            .trigger_step
            .as_ref()
            .is_some_and(|t| t == &step.name);

        let pipeline_date = date_folder(self.journal.date);
        let log_path = self
            .paths
            .log_dir(self.journal.date)
            .join(format!("{}.attempt{}.log", name, attempt_no));

        let runner = Arc::clone(&self.runner);
        let hygiene = Arc::clone(&self.hygiene);
        let step_def = step.clone();
        let tx = self.outcomes_tx.clone();
        let wake = Arc::clone(&self.wake);

        tokio::spawn(async move {
            let result = if is_hygiene_trigger {
                let start = std::time::Instant::now();
                hygiene.terminate_family("scheduled_daily").await;
                Ok(RunResult {
                    exit_code: Some(0),
                    duration: start.elapsed(),
                    stdout_tail: String::new(),
                    stderr_tail: String::new(),
                    killed_due_to_timeout: false,
                })
            } else {
                runner
                    .run(&step_def, attempt_no, &pipeline_date, &log_path)
                    .await
            };
            let _ = tx.send(StepOutcome {
                step: name,
                attempt_no,
                result,
            });
            wake.notify_one();
        });

        Ok(())
    }

    async fn apply_outcome(
        &mut self,
        now: DateTime<Local>,
        outcome: StepOutcome,
        report: &mut TickReport,
    ) -> Result<(), PipelineError> {
        self.running.remove(&outcome.step);
        let Some(step) = self
            .config
            .steps
            .iter()
            .find(|s| s.name.as_str() == outcome.step.as_str())
            .cloned()
        else {
            return Ok(());
        };
        tracing::debug!(step = %outcome.step, attempt = outcome.attempt_no, "applying step outcome");

        match outcome.result {
            Err(e) => {
                self.handle_failure(now, &step, e.to_string(), None, false)
                    .await?;
                report.failed.push(outcome.step);
            }
            Ok(run_result) if run_result.succeeded() => {
                let artifact_ok = match &step.post_success_artifact_check {
                    Some(check) => self.check_artifact(check).await,
                    None => true,
                };
                if artifact_ok {
                    self.mark_done(now, &step, run_result).await?;
                    report.done.push(outcome.step);
                } else {
                    self.handle_failure(
                        now,
                        &step,
                        "post-success artifact check failed".to_string(),
                        run_result.exit_code,
                        false,
                    )
                    .await?;
                    report.failed.push(outcome.step);
                }
            }
            Ok(run_result) => {
                let reason = format!(
                    "exited {:?}{}: {}",
                    run_result.exit_code,
                    if run_result.killed_due_to_timeout {
                        " (timed out)"
                    } else {
                        ""
                    },
                    run_result.stderr_tail
                );
                self.handle_failure(
                    now,
                    &step,
                    reason,
                    run_result.exit_code,
                    run_result.killed_due_to_timeout,
                )
                .await?;
                report.failed.push(outcome.step);
            }
        }

        Ok(())
    }

    async fn check_artifact(&self, check: &ArtifactCheck) -> bool {
        let folder = self.paths.artifact_dir(check.dir, self.journal.date);
        let count = self
            .probe
            .count_files(&folder, &check.glob, check.min_size_bytes, check.min_age_millis)
            .await;
        count >= check.min_count as i64
    }

    async fn mark_done(
        &mut self,
        now: DateTime<Local>,
        step: &StepDef,
        run_result: RunResult,
    ) -> Result<(), PipelineError> {
        let name = step.name.as_str();
        if let Some(state) = self.journal.step_mut(name) {
            state.mark_done(now, run_result.exit_code.unwrap_or(0));
        }
        self.raise_alert(Alert::step_completed(name)).await;
        self.journal_store.save(&self.journal)?;

        if step.closes_application_on_exit {
            let hygiene = Arc::clone(&self.hygiene);
            let reason = format!("step_exit:{name}");
            tokio::spawn(async move { hygiene.terminate_family(&reason).await });
        }
        Ok(())
    }

    /// Record a failed attempt, notify (deduplicated to the first failure
    /// of the day per step), and decide whether a retry is still allowed:
    /// `attempts_today < max_attempts_per_window` and the step is either
    /// still `InWindow` or `Missed` with `catch_up` enabled.
    async fn handle_failure(
        &mut self,
        now: DateTime<Local>,
        step: &StepDef,
        reason: String,
        exit_code: Option<i32>,
        killed_due_to_timeout: bool,
    ) -> Result<(), PipelineError> {
        let name = step.name.as_str();

        if let Some(state) = self.journal.step_mut(name) {
            state.mark_failed(now, exit_code, reason.clone(), killed_due_to_timeout);
        }
        self.raise_alert(Alert::step_failed(name, &reason)).await;

        let attempts_today = self.journal.step(name).map(|s| s.attempts_today).unwrap_or(0);
        let eval = window::evaluate(&step.windows, &step.required_days_of_week, now);
        let window_still_open = matches!(eval, window::WindowEvaluation::InWindow)
            || matches!(eval, window::WindowEvaluation::Missed if step.catch_up);
        let can_retry = attempts_today < step.max_attempts_per_window && window_still_open;

        if can_retry {
            let delay = crate::backoff::jittered(crate::backoff::backoff_delay(attempts_today));
            if let Some(state) = self.journal.step_mut(name) {
                let delay = chrono::Duration::from_std(delay)
                    .unwrap_or_else(|_| chrono::Duration::seconds(0));
                state.mark_pending_for_retry(now + delay);
            }
        }

        self.journal_store.save(&self.journal)?;
        Ok(())
    }

    /// Record an alert, deduplicated via the Journal's `alerts_sent` set
    /// (the same atomic write as the rest of the step transition that
    /// raised it — callers persist after this returns).
    async fn raise_alert(&mut self, alert: Alert) {
        if !self.journal.record_alert_sent(alert.dedup_key.clone()) {
            return;
        }
        if let Err(e) = self.notifier.notify(&alert).await {
            warn!(error = %e, dedup_key = %alert.dedup_key, "notifier failed, alert not delivered");
        }
    }

    /// Raise the `StartupNotice` alert (C6), deduplicated per day like any
    /// other alert. Called once by the Supervisor after `start()` finishes
    /// reconciling orphaned steps, so a restart later the same day stays
    /// quiet.
    pub async fn raise_startup_notice(&mut self) -> Result<(), PipelineError> {
        self.raise_alert(Alert::startup_notice(self.journal.date)).await;
        self.journal_store.save(&self.journal)?;
        Ok(())
    }

    async fn maybe_raise_heartbeat(&mut self, now: DateTime<Local>) -> Result<(), PipelineError> {
        if !self.journal.alerts_sent.is_empty() {
            return Ok(());
        }
        if now.time() < self.config.heartbeat_time {
            return Ok(());
        }
        self.raise_alert(Alert::heartbeat(self.journal.date)).await;
        self.journal_store.save(&self.journal)?;
        Ok(())
    }

    async fn maybe_raise_daily_report(&mut self, now: DateTime<Local>) -> Result<(), PipelineError> {
        if !self.journal.all_steps_settled() {
            return Ok(());
        }
        let dedup_key = format!("daily_report:{}", self.journal.date);
        if self.journal.alert_already_sent(&dedup_key) {
            return Ok(());
        }
        let summary = self.render_summary(now);
        self.raise_alert(Alert::daily_report(self.journal.date, summary)).await;
        self.journal_store.save(&self.journal)?;
        Ok(())
    }

    fn render_summary(&self, _now: DateTime<Local>) -> String {
        let mut lines = Vec::new();
        for step in &self.config.steps {
            let status = self
                .journal
                .step(step.name.as_str())
                .map(|s| s.status)
                .unwrap_or(dayorch_core::StepStatus::Pending);
            lines.push(format!("{}: {}", step.name, status));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
