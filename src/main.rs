//! todosync - Todoist to Obsidian
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};

mod cli;
mod logging;
mod settings;

use logging::LogTarget;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    let target = if cli.uses_status_panel() && cli::status::panel_available() {
        LogTarget::File(logging::log_dir())
    } else {
        LogTarget::Stderr
    };
    let _log_guard = logging::init(cli.verbose, &target)?;

    if let LogTarget::File(dir) = &target {
        println!("📝 Logs: {}", dir.display());
    }

    if cli.command.is_some() {
        info!("Starting todosync v{}", env!("CARGO_PKG_VERSION"));
        if !std::path::Path::new(".env").exists() {
            debug!(".env file not found. Run 'todosync init' to create one.");
        }
    }

    cli::run(cli).await
}
