// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Runner (C3): spawns a step's external program, enforces its
//! timeout against the whole process tree, and captures a bounded tail
//! of its output.

use crate::ring_buffer::RingBuffer;
use dayorch_core::StepDef;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use sysinfo::{Pid, System};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Last N KB of stdout/stderr retained per run, for journal and alert
/// inclusion. Full output still goes to the per-step log file.
const TAIL_CAPACITY_BYTES: usize = 16 * 1024;

/// Outcome of one invocation of a step's executable.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub stdout_tail: String,
    pub stderr_tail: String,
    pub killed_due_to_timeout: bool,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Spawns step executables and mailer invocations, under a timeout, with
/// process-tree termination on expiry or cancellation.
pub struct JobRunner {
    root_dir: std::path::PathBuf,
}

impl JobRunner {
    pub fn new(root_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Run `step` for the given 1-based `attempt_no`, writing full
    /// stdout/stderr to files alongside `log_path` and returning a
    /// bounded tail of each.
    pub async fn run(
        &self,
        step: &StepDef,
        attempt_no: u32,
        pipeline_date: &str,
        log_path: &Path,
    ) -> std::io::Result<RunResult> {
        self.run_command(
            &step.executable,
            &step.arguments,
            step.timeout,
            pipeline_date,
            &step.name,
            attempt_no,
            log_path,
        )
        .await
    }

    /// Run an arbitrary external program (used by the mailer) under the
    /// same timeout/kill/tail contract as a step. Stdout is written to
    /// `log_path`, stderr to a sibling file with a `.stderr` suffix
    /// inserted before the extension.
    #[allow(clippy::too_many_arguments)]
    pub async fn run_command(
        &self,
        executable: &Path,
        arguments: &[String],
        timeout: Duration,
        pipeline_date: &str,
        pipeline_step: &str,
        attempt_no: u32,
        log_path: &Path,
    ) -> std::io::Result<RunResult> {
        if let Some(parent) = log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let stderr_log_path = sibling_stderr_path(log_path);
        let stdout_log_file = tokio::fs::File::create(log_path).await?;
        let stderr_log_file = tokio::fs::File::create(&stderr_log_path).await?;
        let mut stdout_log_file = tokio::io::BufWriter::new(stdout_log_file);
        let mut stderr_log_file = tokio::io::BufWriter::new(stderr_log_file);

        let mut cmd = Command::new(executable);
        cmd.args(arguments)
            .current_dir(&self.root_dir)
            .env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("PIPELINE_DATE", pipeline_date)
            .env("PIPELINE_ROOT", &self.root_dir)
            .env("PIPELINE_STEP", pipeline_step)
            .env("PIPELINE_ATTEMPT", attempt_no.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = std::time::Instant::now();
        let mut child = cmd.spawn()?;
        let pid = child.id();

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let mut stdout_tail = RingBuffer::new(TAIL_CAPACITY_BYTES);
        let mut stderr_tail = RingBuffer::new(TAIL_CAPACITY_BYTES);

        let wait = async {
            tokio::try_join!(
                drain(&mut stdout, &mut stdout_tail, &mut stdout_log_file),
                drain(&mut stderr, &mut stderr_tail, &mut stderr_log_file),
            )?;
            child.wait().await
        };

        use tokio::io::AsyncWriteExt;
        match tokio::time::timeout(timeout, wait).await {
            Ok(Ok(status)) => {
                let _ = stdout_log_file.flush().await;
                let _ = stderr_log_file.flush().await;
                Ok(RunResult {
                    exit_code: status.code(),
                    duration: start.elapsed(),
                    stdout_tail: stdout_tail.to_string_lossy(),
                    stderr_tail: stderr_tail.to_string_lossy(),
                    killed_due_to_timeout: false,
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => {
                if let Some(pid) = pid {
                    kill_process_tree(pid);
                }
                let _ = child.kill().await;
                let _ = stdout_log_file.flush().await;
                let _ = stderr_log_file.flush().await;
                Ok(RunResult {
                    exit_code: None,
                    duration: start.elapsed(),
                    stdout_tail: stdout_tail.to_string_lossy(),
                    stderr_tail: stderr_tail.to_string_lossy(),
                    killed_due_to_timeout: true,
                })
            }
        }
    }
}

fn sibling_stderr_path(log_path: &Path) -> std::path::PathBuf {
    match log_path.extension() {
        Some(ext) => log_path.with_extension(format!("stderr.{}", ext.to_string_lossy())),
        None => {
            let mut name = log_path.as_os_str().to_os_string();
            name.push(".stderr");
            std::path::PathBuf::from(name)
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(
    stream: &mut Option<R>,
    tail: &mut RingBuffer,
    log_file: &mut tokio::io::BufWriter<tokio::fs::File>,
) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;
    let Some(stream) = stream else {
        return Ok(());
    };
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        tail.push(&chunk[..n]);
        log_file.write_all(&chunk[..n]).await?;
    }
    Ok(())
}

/// Kill every live process whose parent PID is (transitively) `root_pid`,
/// then the root itself. Best-effort: a process that exits mid-walk is
/// simply absent from the next refresh.
fn kill_process_tree(root_pid: u32) {
    let mut system = System::new();
    system.refresh_processes();

    let root = Pid::from(root_pid as usize);
    let mut descendants = vec![root];
    let mut frontier = vec![root];
    while let Some(parent) = frontier.pop() {
        for (pid, process) in system.processes() {
            if process.parent() == Some(parent) && !descendants.contains(pid) {
                descendants.push(*pid);
                frontier.push(*pid);
            }
        }
    }

    // Kill leaves before the root so a dying parent doesn't reparent a
    // survivor to PID 1 before we get to it.
    for pid in descendants.iter().rev() {
        if let Some(process) = system.process(*pid) {
            process.kill();
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
