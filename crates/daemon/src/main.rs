// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dayorchd`: entry point wiring the command-line surface (§6.5) to the
//! Supervisor Loop. Exit codes follow §6.5/§7: 0 normal, 2 config
//! invalid, 3 lock held by peer, 4 state dir unwritable, 1 otherwise.

use clap::Parser;
use dayorch_adapters::{JobRunner, MailerNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter};
use dayorch_core::{Config, Paths};
use dayorch_daemon::cli::Cli;
use dayorch_daemon::errors::SupervisorError;
use dayorch_daemon::supervisor::{self, Supervisor};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("dayorchd: {err}");
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), SupervisorError> {
    if cli.validate {
        supervisor::load_and_validate(&cli.config)?;
        println!("configuration valid");
        return Ok(());
    }

    let config = Config::load(&cli.config)?;

    if cli.status {
        let text = supervisor::read_status(&config)?;
        print!("{text}");
        return Ok(());
    }

    if cli.reset_today {
        supervisor::reset_today(&config)?;
        println!("today's journal reset");
        return Ok(());
    }

    let paths = Paths::new(
        config.root_dir.clone(),
        config.state_dir.clone(),
        config.log_dir.clone(),
    );
    let today = chrono::Local::now().date_naive();
    let _guard = dayorch_daemon::logging::setup_logging(&paths.log_dir(today))?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_supervisor(config, paths))
}

async fn run_supervisor(config: Config, paths: Paths) -> Result<(), SupervisorError> {
    let runner = Arc::new(JobRunner::new(paths.root_dir.clone()));
    let today = chrono::Local::now().date_naive();
    let mailer_log = paths.log_dir(today).join("mailer.log");

    if config.mailer_executable.as_os_str().is_empty() {
        let notifier = NoOpNotifyAdapter::new();
        run_with_notifier(config, notifier).await
    } else {
        let notifier = MailerNotifyAdapter::new(
            Arc::clone(&runner),
            config.mailer_executable.clone(),
            config.mailer_args_template.clone(),
            mailer_log,
        );
        run_with_notifier(config, notifier).await
    }
}

async fn run_with_notifier<N: NotifyAdapter>(
    config: Config,
    notifier: N,
) -> Result<(), SupervisorError> {
    let supervisor = Supervisor::start(config, notifier).await?;

    tracing::info!("dayorchd started");
    let result = supervisor.run().await;
    if let Err(err) = &result {
        error!(error = %err, "supervisor exited with error");
    }
    result
}
