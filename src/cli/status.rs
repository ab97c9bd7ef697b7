//! Live status panel
//!
//! An inline ratatui viewport below the command line, redrawn at most once per
//! second. A scheduler state change is picked up at the next redraw slot. Text
//! is built by [`status_lines`] so it can be tested without a terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal, TerminalOptions, Viewport,
};
use std::io::{self, IsTerminal};
use std::time::Duration;
use tokio::time::Instant;
use todosync_core::{OutcomeStatus, ScheduleState, StatusHandle, SyncConfiguration};

const REFRESH: Duration = Duration::from_secs(1);

/// Static facts about the run, shown under the live fields
#[derive(Debug, Clone)]
pub struct PanelInfo {
    pub timing: String,
    pub output_dir: String,
    pub project: String,
    pub filter: String,
    pub include_completed: bool,
}

impl PanelInfo {
    pub fn from_config(config: &SyncConfiguration) -> Self {
        Self {
            timing: config.timing.to_string(),
            output_dir: config.export.output_dir.display().to_string(),
            project: config.project.to_string(),
            filter: config.filter.clone().unwrap_or_else(|| "none".to_string()),
            include_completed: config.include_completed,
        }
    }
}

/// Whether stdout can host the panel
pub fn panel_available() -> bool {
    io::stdout().is_terminal()
}

/// Nine field rows plus the border
const PANEL_HEIGHT: u16 = 11;

/// Render the panel until the scheduler stops
pub async fn run_panel(mut status: StatusHandle, info: PanelInfo) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(PANEL_HEIGHT),
        },
    )
    .context("Failed to create status panel")?;

    loop {
        let last_draw = Instant::now();
        let state = status.snapshot();
        let lines = status_lines(&state, &info, Local::now());
        terminal
            .draw(|frame| {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(" todosync ")
                    .border_style(Style::default().fg(Color::DarkGray));
                frame.render_widget(Paragraph::new(lines).block(block), frame.area());
            })
            .context("Failed to draw status panel")?;

        if state.stopped {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(REFRESH) => {}
            alive = status.changed() => {
                if !alive {
                    break;
                }
                tokio::time::sleep(redraw_delay(last_draw.elapsed())).await;
            }
        }
    }

    println!();
    Ok(())
}

/// Time left before the next redraw is allowed
fn redraw_delay(since_last_draw: Duration) -> Duration {
    REFRESH.saturating_sub(since_last_draw)
}

/// `4m 05s`, `1h 02m`, `12s`
pub fn format_countdown(remaining: chrono::Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

fn field(label: &'static str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<13}", label), Style::default().fg(Color::Gray)),
        value,
    ])
}

fn when(at: Option<DateTime<Local>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".to_string(),
    }
}

/// Text of the panel for one snapshot
pub fn status_lines(
    state: &ScheduleState,
    info: &PanelInfo,
    now: DateTime<Local>,
) -> Vec<Line<'static>> {
    let status = if state.stopped {
        Span::styled("■ Stopped", Style::default().fg(Color::Red).bold())
    } else if state.running {
        Span::styled("⟳ Syncing", Style::default().fg(Color::Yellow).bold())
    } else {
        Span::styled("● Running", Style::default().fg(Color::Green).bold())
    };

    let syncs = if state.failure_count > 0 {
        format!("{} ({} failed)", state.run_count, state.failure_count)
    } else {
        state.run_count.to_string()
    };

    let next = match state.next_run {
        Some(at) => format!(
            "{} (in {})",
            at.format("%H:%M:%S"),
            format_countdown(at - now)
        ),
        None if state.running => "after this sync".to_string(),
        None => "-".to_string(),
    };

    let outcome = match &state.last_outcome {
        Some(outcome) => {
            let (icon, color) = match outcome.status {
                OutcomeStatus::Success => ("✅", Color::Green),
                OutcomeStatus::Partial => ("⚠️", Color::Yellow),
                OutcomeStatus::Failure => ("❌", Color::Red),
            };
            Span::styled(
                format!("{} {}", icon, outcome.summary),
                Style::default().fg(color),
            )
        }
        None => Span::raw("-"),
    };

    vec![
        field("Status", status),
        field("Syncs", Span::raw(syncs)),
        field("Last sync", Span::raw(when(state.last_run))),
        field("Next sync", Span::raw(next)),
        field("Last result", outcome),
        field("Schedule", Span::raw(info.timing.clone())),
        field("Output", Span::raw(info.output_dir.clone())),
        field("Project", Span::raw(format!("{} (filter: {})", info.project, info.filter))),
        field(
            "Completed",
            Span::raw(if info.include_completed { "included" } else { "skipped" }),
        ),
    ]
}
