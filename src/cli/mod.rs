//! CLI module for todosync
//!
//! Provides the commands:
//! - `init`: write a `.env` template
//! - `test`: check the Todoist connection
//! - `list-projects`: show projects and their ids
//! - `export`: run one sync cycle
//! - `schedule`: sync on an interval or at a daily time

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

pub mod export;
pub mod init;
pub mod options;
pub mod remote;
pub mod schedule;
pub mod status;

/// Export Todoist tasks as Obsidian markdown notes
#[derive(Parser, Debug)]
#[command(name = "todosync")]
#[command(about = "Export Todoist tasks as Obsidian-compatible markdown notes")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .env template
    Init {
        /// Directory where the .env file is created
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Test the connection to the Todoist API
    Test(TokenArgs),
    /// List all projects in your Todoist account
    ListProjects(TokenArgs),
    /// Export tasks once
    Export(ExportArgs),
    /// Sync on a schedule
    Schedule(ScheduleArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct TokenArgs {
    /// Todoist API token (or set TODOIST_API_TOKEN)
    #[arg(short = 't', long)]
    pub api_token: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    #[command(flatten)]
    pub token: TokenArgs,

    /// Output directory for notes (or set EXPORT_OUTPUT_DIR)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Only tasks from this project id
    #[arg(short = 'p', long)]
    pub project_id: Option<String>,

    /// Only tasks from this project name (case-insensitive)
    #[arg(long, conflicts_with = "project_id")]
    pub project_name: Option<String>,

    /// Include completed tasks
    #[arg(short = 'c', long)]
    pub include_completed: bool,

    /// Skip task comments
    #[arg(long)]
    pub no_comments: bool,

    /// Prefix for generated tags
    #[arg(long)]
    pub tag_prefix: Option<String>,

    /// Todoist filter expression (e.g. 'today', 'overdue', '@urgent')
    #[arg(short, long)]
    pub filter: Option<String>,

    /// One folder per project
    #[arg(long)]
    pub project_folders: bool,

    /// Tasks processed in parallel
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub export: ExportArgs,

    /// Sync interval in minutes [default: 15]
    #[arg(long)]
    pub interval: Option<u64>,

    /// Daily sync time in HH:MM (e.g. '09:00')
    #[arg(long = "time", value_name = "HH:MM")]
    pub time: Option<String>,

    /// Run one sync immediately and exit
    #[arg(long)]
    pub once: bool,

    /// Don't show the live status panel
    #[arg(long)]
    pub no_status: bool,

    /// Wait for the first scheduled time instead of syncing at start-up
    #[arg(long)]
    pub no_immediate: bool,
}

impl Cli {
    /// Whether the command takes over the terminal with the status panel
    pub fn uses_status_panel(&self) -> bool {
        matches!(
            &self.command,
            Some(Commands::Schedule(args)) if !args.no_status && !args.once
        )
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let command = match cli.command {
        Some(command) => command,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            return Ok(ExitCode::SUCCESS);
        }
    };

    if let Commands::Init { output_dir } = &command {
        init::run(output_dir).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let app = crate::settings::load_config()?;

    match command {
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
        Commands::Test(args) => remote::test(&app, &args).await,
        Commands::ListProjects(args) => remote::list_projects(&app, &args).await,
        Commands::Export(args) => export::run(&app, &args).await,
        Commands::Schedule(args) => schedule::run(&app, &args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_schedule_flags() {
        let cli = Cli::parse_from([
            "todosync", "schedule", "--time", "08:00", "-p", "123", "--no-comments", "-v",
        ]);
        assert!(cli.verbose);
        assert!(cli.uses_status_panel());
        let Some(Commands::Schedule(args)) = cli.command else {
            panic!("expected schedule");
        };
        assert_eq!(args.time.as_deref(), Some("08:00"));
        assert_eq!(args.export.project_id.as_deref(), Some("123"));
        assert!(args.export.no_comments);
        assert!(args.interval.is_none());
    }

    #[test]
    fn test_once_and_no_status_skip_panel() {
        let once = Cli::parse_from(["todosync", "schedule", "--once"]);
        assert!(!once.uses_status_panel());
        let quiet = Cli::parse_from(["todosync", "schedule", "--no-status"]);
        assert!(!quiet.uses_status_panel());
        let export = Cli::parse_from(["todosync", "export"]);
        assert!(!export.uses_status_panel());
    }

    #[test]
    fn test_project_id_and_name_conflict() {
        let result = Cli::try_parse_from([
            "todosync", "export", "--project-id", "1", "--project-name", "Work",
        ]);
        assert!(result.is_err());
    }
}
