//! `export`: one sync cycle and a summary

use super::options::{export_configuration, resolve_token};
use super::ExportArgs;
use crate::settings::AppConfig;
use anyhow::Context;
use std::process::ExitCode;
use std::sync::Arc;
use todosync_core::{format_error_for_cli, Scheduler, SyncConfiguration, SyncCycle, SyncResult};
use todosync_notes::{FsNoteWriter, MarkdownRenderer};
use todosync_todoist::TodoistClient;

/// Errors listed before the rest are summarised as a count
const MAX_LISTED_ERRORS: usize = 10;

/// Wire the Todoist client, renderer and writer into a cycle
pub fn build_cycle(
    app: &AppConfig,
    token: String,
    config: &SyncConfiguration,
) -> anyhow::Result<SyncCycle> {
    let client = TodoistClient::new(app.todoist.client_config(token))
        .context("Failed to create Todoist client")?;
    Ok(SyncCycle::new(
        Arc::new(client),
        Arc::new(MarkdownRenderer::new(config.export.clone())),
        Arc::new(FsNoteWriter::new()),
    ))
}

pub async fn run(app: &AppConfig, args: &ExportArgs) -> anyhow::Result<ExitCode> {
    let config = export_configuration(app, args);
    let token = match resolve_token(app, &args.token) {
        Ok(token) => token,
        Err(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let scheduler = Scheduler::new(build_cycle(app, token, &config)?);

    println!("Exporting tasks to {} ...", config.export.output_dir.display());
    let result = match scheduler.run_once(&config).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(failure) = &result.failure {
        eprintln!("{}", format_error_for_cli(failure));
        return Ok(ExitCode::FAILURE);
    }

    print!("{}", summary_text(&result, &config));
    Ok(exit_code(&result))
}

/// Non-zero unless every task was written
pub fn exit_code(result: &SyncResult) -> ExitCode {
    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Summary shown after a successful or partial export
pub fn summary_text(result: &SyncResult, config: &SyncConfiguration) -> String {
    let output_dir = std::path::absolute(&config.export.output_dir)
        .unwrap_or_else(|_| config.export.output_dir.clone());

    let mut out = String::new();
    if result.errors.is_empty() {
        out.push_str("\n✅ Export completed successfully!\n\n");
    } else {
        out.push_str("\n⚠️ Export completed with errors\n\n");
    }

    out.push_str(&format!("Exported: {} tasks\n", result.written));
    if !result.errors.is_empty() {
        out.push_str(&format!("Failed: {} tasks\n", result.errors.len()));
    }
    if result.skipped > 0 {
        out.push_str(&format!("Skipped: {} tasks\n", result.skipped));
    }
    out.push_str(&format!("Output directory: {}\n", output_dir.display()));
    out.push_str(&format!(
        "Included completed tasks: {}\n",
        yes_no(config.include_completed)
    ));
    out.push_str(&format!(
        "Included comments: {}\n",
        yes_no(config.export.include_comments)
    ));
    out.push_str(&format!(
        "Took: {:.1}s\n",
        result.duration().num_milliseconds() as f64 / 1000.0
    ));

    if !result.errors.is_empty() {
        out.push_str("\nErrors:\n");
        for error in result.errors.iter().take(MAX_LISTED_ERRORS) {
            out.push_str(&format!("  - {}\n", error));
        }
        if result.errors.len() > MAX_LISTED_ERRORS {
            out.push_str(&format!(
                "  ... and {} more\n",
                result.errors.len() - MAX_LISTED_ERRORS
            ));
        }
    }

    if !result.warnings.is_empty() {
        out.push_str(&format!(
            "\n{} warnings (run with -v for details)\n",
            result.warnings.len()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use todosync_core::TaskError;
    use todosync_notes::{ExportSettings, RenderError};

    fn result(written: usize, errors: Vec<TaskError>) -> SyncResult {
        let now = Local::now();
        SyncResult {
            started_at: now,
            finished_at: now + chrono::Duration::milliseconds(1500),
            fetched: written + errors.len(),
            processed: written + errors.len(),
            written,
            skipped: 0,
            success: errors.is_empty(),
            errors,
            warnings: Vec::new(),
            failure: None,
        }
    }

    #[test]
    fn test_summary_for_clean_export() {
        let config = SyncConfiguration::new(ExportSettings::new("/vault/todoist"));
        let text = summary_text(&result(12, Vec::new()), &config);

        assert!(text.contains("✅ Export completed successfully!"));
        assert!(text.contains("Exported: 12 tasks"));
        assert!(text.contains("Output directory: /vault/todoist"));
        assert!(text.contains("Included completed tasks: No"));
        assert!(text.contains("Included comments: Yes"));
        assert!(text.contains("Took: 1.5s"));
        assert!(!text.contains("Errors:"));
    }

    #[test]
    fn test_summary_lists_errors_and_truncates() {
        let errors = (0..13)
            .map(|i| TaskError::render(i.to_string(), &RenderError::MissingTaskId))
            .collect();
        let config = SyncConfiguration::new(ExportSettings::new("/vault"));
        let res = result(2, errors);
        let text = summary_text(&res, &config);

        assert!(text.contains("⚠️ Export completed with errors"));
        assert!(text.contains("Failed: 13 tasks"));
        assert!(text.contains("  - task 0 (render)"));
        assert!(text.contains("... and 3 more"));
        assert!(!res.success);
    }
}
