//! CLI flags applied on top of the loaded configuration

use super::{ExportArgs, ScheduleArgs, TokenArgs};
use crate::settings::AppConfig;
use todosync_core::{ConfigError, ProjectScope, SyncConfiguration, TimingMode};

/// `--api-token`, else the configured token; blank counts as missing
pub fn resolve_token(app: &AppConfig, args: &TokenArgs) -> Result<String, ConfigError> {
    args.api_token
        .as_deref()
        .or(app.todoist.api_token.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingToken)
}

/// Sync configuration for a one-shot export
pub fn export_configuration(app: &AppConfig, args: &ExportArgs) -> SyncConfiguration {
    let mut config = app.sync_configuration();

    if let Some(dir) = &args.output_dir {
        config.export.output_dir = dir.clone();
    }
    if let Some(prefix) = &args.tag_prefix {
        config.export.tag_prefix = prefix.clone();
    }
    if args.no_comments {
        config.export.include_comments = false;
    }
    if args.project_folders {
        config.export.project_folders = true;
    }
    if args.include_completed {
        config.include_completed = true;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(filter) = &args.filter {
        config.filter = Some(filter.clone());
    }

    config.project = match (&args.project_id, &args.project_name) {
        (Some(id), _) => ProjectScope::Id(id.clone()),
        (None, Some(name)) => ProjectScope::Name(name.clone()),
        (None, None) => ProjectScope::All,
    };

    config
}

/// Sync configuration for the scheduler
pub fn schedule_configuration(app: &AppConfig, args: &ScheduleArgs) -> SyncConfiguration {
    let mut config = export_configuration(app, &args.export);

    // an explicit --interval wins over a configured daily time
    config.timing = match (&args.time, args.interval) {
        (Some(at), _) => TimingMode::Daily(at.clone()),
        (None, Some(minutes)) => TimingMode::every_minutes(minutes),
        (None, None) => app.sync.timing(),
    };

    config.once = args.once;
    if args.no_status {
        config.show_status = false;
    }
    if args.no_immediate {
        config.run_immediately = false;
    }

    config
}
