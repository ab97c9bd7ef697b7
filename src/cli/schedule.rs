//! `schedule`: run the scheduler until Ctrl+C / SIGTERM

use super::export::build_cycle;
use super::options::{resolve_token, schedule_configuration};
use super::status::{panel_available, run_panel, PanelInfo};
use super::ScheduleArgs;
use crate::settings::AppConfig;
use std::process::ExitCode;
use std::sync::Arc;
use todosync_core::{
    format_error_for_cli, spawn_signal_listener, ExitOutcome, OutcomeStatus, Scheduler,
};
use tracing::warn;

pub async fn run(app: &AppConfig, args: &ScheduleArgs) -> anyhow::Result<ExitCode> {
    let config = schedule_configuration(app, args);
    let token = match resolve_token(app, &args.export.token) {
        Ok(token) => token,
        Err(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let scheduler = Arc::new(Scheduler::new(build_cycle(app, token, &config)?));
    let signals = spawn_signal_listener(scheduler.shutdown_handle());

    if config.once {
        println!("🔄 Running a single sync");
    } else {
        println!("⏰ Scheduled sync {}", config.timing);
        println!("   Press Ctrl+C to stop\n");
    }

    let panel = (config.show_status && !config.once && panel_available())
        .then(|| tokio::spawn(run_panel(scheduler.status(), PanelInfo::from_config(&config))));

    let outcome = scheduler.start(&config).await;
    signals.abort();

    if let Some(panel) = panel {
        match panel.await {
            Ok(Err(e)) => warn!("Status panel failed: {:#}", e),
            Err(e) => warn!("Status panel task failed: {}", e),
            Ok(Ok(())) => {}
        }
    }

    let state = scheduler.status().snapshot();
    match outcome {
        ExitOutcome::CleanShutdown => {
            if config.once {
                let succeeded = state
                    .last_outcome
                    .as_ref()
                    .is_some_and(|o| o.status == OutcomeStatus::Success);
                if let Some(outcome) = &state.last_outcome {
                    println!("{}", outcome.summary);
                }
                return Ok(if succeeded {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                });
            }
            println!(
                "👋 Scheduler stopped after {} syncs ({} failed)",
                state.run_count, state.failure_count
            );
            Ok(ExitCode::SUCCESS)
        }
        ExitOutcome::FatalConfigError(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            Ok(ExitCode::FAILURE)
        }
        ExitOutcome::FatalTimingError(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}
