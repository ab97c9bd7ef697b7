//! `test` and `list-projects`

use super::options::resolve_token;
use super::TokenArgs;
use crate::settings::AppConfig;
use anyhow::Context;
use std::process::ExitCode;
use todosync_core::{format_error_for_cli, CycleFailure};
use todosync_todoist::{Project, TaskSource, TodoistClient};
use unicode_width::UnicodeWidthStr;

fn client(app: &AppConfig, args: &TokenArgs) -> anyhow::Result<Result<TodoistClient, ExitCode>> {
    let token = match resolve_token(app, args) {
        Ok(token) => token,
        Err(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            return Ok(Err(ExitCode::FAILURE));
        }
    };
    let client = TodoistClient::new(app.todoist.client_config(token))
        .context("Failed to create Todoist client")?;
    Ok(Ok(client))
}

pub async fn test(app: &AppConfig, args: &TokenArgs) -> anyhow::Result<ExitCode> {
    let client = match client(app, args)? {
        Ok(client) => client,
        Err(code) => return Ok(code),
    };

    println!("Testing connection to {} ...", client.base_url());

    match client.test_connection().await {
        Ok(count) => {
            println!("✅ Successfully connected to Todoist API!");
            println!("Found {} projects in your account.", count);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let failure = CycleFailure::from_source(&e, "connection test");
            eprintln!("❌ Connection failed\n");
            eprintln!("{}", format_error_for_cli(&failure));
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn list_projects(app: &AppConfig, args: &TokenArgs) -> anyhow::Result<ExitCode> {
    let client = match client(app, args)? {
        Ok(client) => client,
        Err(code) => return Ok(code),
    };

    match client.list_projects().await {
        Ok(projects) if projects.is_empty() => {
            println!("No projects found in your account.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(projects) => {
            print!("{}", project_table(&projects));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let failure = CycleFailure::from_source(&e, "listing projects");
            eprintln!("{}", format_error_for_cli(&failure));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Plain-text table: ID, Name, Color, Shared
pub fn project_table(projects: &[Project]) -> String {
    let header = ["ID", "Name", "Color", "Shared"];
    let rows: Vec<[String; 4]> = projects
        .iter()
        .map(|p| {
            [
                p.id.clone(),
                p.name.clone(),
                p.color.clone(),
                if p.is_shared { "yes".into() } else { String::new() },
            ]
        })
        .collect();

    let mut widths = header.map(UnicodeWidthStr::width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}
