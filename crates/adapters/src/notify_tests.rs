// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::JobRunner;
use dayorch_core::AlertKind;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

fn executable_script(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn noop_adapter_discards_everything() {
    let alert = Alert::heartbeat(chrono::NaiveDate::from_ymd_opt(2026, 7, 27).unwrap());
    NoOpNotifyAdapter::new().notify(&alert).await.unwrap();
}

#[tokio::test]
async fn fake_adapter_records_notifications() {
    let fake = FakeNotifyAdapter::new();
    let alert = Alert::step_failed("dl_am", "boom");
    fake.notify(&alert).await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].alert.kind, AlertKind::StepFailed);
}

#[tokio::test]
async fn mailer_adapter_invokes_the_configured_executable() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = executable_script(dir.path(), "mailer.sh", "echo \"$@\"");
    let runner = Arc::new(JobRunner::new(dir.path()));
    let adapter = MailerNotifyAdapter::new(
        runner,
        mailer,
        "{kind} {subject}".to_string(),
        dir.path().join("mailer.log"),
    );

    let alert = Alert::step_completed("dl_am");
    adapter.notify(&alert).await.unwrap();

    let log = std::fs::read_to_string(dir.path().join("mailer.log")).unwrap();
    assert!(log.contains("StepCompleted"));
}

#[tokio::test]
async fn mailer_adapter_reports_a_nonzero_exit_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mailer = executable_script(dir.path(), "failing_mailer.sh", "exit 3");
    let runner = Arc::new(JobRunner::new(dir.path()));
    let adapter = MailerNotifyAdapter::new(
        runner,
        mailer,
        "{kind} {subject}".to_string(),
        dir.path().join("mailer.log"),
    );

    let alert = Alert::heartbeat(chrono::NaiveDate::from_ymd_opt(2026, 7, 27).unwrap());
    let err = adapter.notify(&alert).await.unwrap_err();
    assert!(matches!(err, NotifyError::SendFailed(_)));
}
