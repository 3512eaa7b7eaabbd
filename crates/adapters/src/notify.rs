// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapters (C6: Notifier).
//!
//! Delivery is fire-and-forget and routed through the configured mailer
//! executable, itself invoked via the Job Runner, so a notification
//! failure never blocks or fails the step that triggered it.

use crate::runner::JobRunner;
use async_trait::async_trait;
use dayorch_core::Alert;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Fixed timeout for every mailer invocation, independent of any step's
/// own `timeout`.
const MAILER_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Delivers alerts by invoking a configured mailer executable through the
/// Job Runner (C6, §4.6). Fire-and-forget: a failed delivery is logged by
/// the caller and never propagated to the step that raised the alert.
#[derive(Clone)]
pub struct MailerNotifyAdapter {
    runner: Arc<JobRunner>,
    mailer_executable: PathBuf,
    args_template: String,
    log_path: PathBuf,
}

impl MailerNotifyAdapter {
    pub fn new(
        runner: Arc<JobRunner>,
        mailer_executable: PathBuf,
        args_template: String,
        log_path: PathBuf,
    ) -> Self {
        Self {
            runner,
            mailer_executable,
            args_template,
            log_path,
        }
    }

    /// Substitutes `{kind}` and `{subject}` placeholders in the configured
    /// args template, then splits on whitespace into argv entries. The body
    /// is passed separately, as the final argument, to avoid any quoting
    /// ambiguity from embedding free-form text into the template.
    fn render_args(&self, alert: &Alert) -> Vec<String> {
        let rendered = self
            .args_template
            .replace("{kind}", &format!("{:?}", alert.kind))
            .replace("{subject}", &alert.subject);
        let mut args: Vec<String> = rendered.split_whitespace().map(str::to_string).collect();
        args.push(alert.body.clone());
        args
    }
}

#[async_trait]
impl NotifyAdapter for MailerNotifyAdapter {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let args = self.render_args(alert);
        let result = self
            .runner
            .run_command(
                &self.mailer_executable,
                &args,
                MAILER_TIMEOUT,
                "",
                "mailer",
                1,
                &self.log_path,
            )
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        if result.succeeded() {
            Ok(())
        } else {
            Err(NotifyError::SendFailed(format!(
                "mailer exited with {:?}: {}",
                result.exit_code, result.stderr_tail
            )))
        }
    }
}

/// Notification adapter that silently discards all notifications.
///
/// Used when no mailer executable is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify(&self, _alert: &Alert) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded notification.
    #[derive(Debug, Clone)]
    pub struct NotifyCall {
        pub alert: Alert,
    }

    struct FakeNotifyState {
        calls: Vec<NotifyCall>,
    }

    #[derive(Clone)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl Default for FakeNotifyAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeNotifyState { calls: Vec::new() })),
            }
        }
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<NotifyCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
            self.inner.lock().calls.push(NotifyCall {
                alert: alert.clone(),
            });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
