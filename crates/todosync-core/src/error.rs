//! Error types for todosync-core
//!
//! This module provides the error taxonomy of the sync engine and
//! user-friendly formatting for the CLI.

use chrono::NaiveTime;
use std::fmt;
use thiserror::Error;
use todosync_notes::{RenderError, WriteError};

const TODOIST_API_DOCS: &str = "https://developer.todoist.com/rest/v2/";

/// Invalid configuration; fatal before any cycle runs
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Interval mode with a zero duration
    #[error("interval must be greater than zero")]
    ZeroInterval,

    /// Interval longer than the scheduler accepts
    #[error("interval must be at most {max_days} days")]
    IntervalTooLarge {
        /// Upper bound in days
        max_days: u64,
    },

    /// Daily time is not a 24-hour `HH:MM`
    #[error("invalid time of day '{value}': expected HH:MM (24-hour)")]
    InvalidTimeOfDay {
        /// Value as given
        value: String,
    },

    /// Concurrency of zero would never process a task
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    /// Output root cannot be created or written
    #[error("output directory is not usable: {0}")]
    OutputDir(#[from] WriteError),

    /// No Todoist API token available
    #[error("Todoist API token not configured")]
    MissingToken,
}

/// The next run time could not be computed; fatal for the loop
#[derive(Debug, Clone, Error)]
pub enum TimingError {
    /// No valid local occurrence of the daily time was found
    #[error("no valid occurrence of {time} within {days} days after {after}")]
    NoOccurrence {
        /// Configured time of day
        time: NaiveTime,
        /// Search window in days
        days: u64,
        /// Reference instant
        after: String,
    },

    /// The next run lies beyond what the clock can represent
    #[error("next run is out of the clock's range")]
    OutOfRange,
}

/// Classification of a cycle-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Token missing or rejected
    Auth,
    /// Transport failure or timeout
    Network,
    /// Remote asked us to back off
    RateLimited,
    /// Configured project name does not exist
    ProjectNotFound,
    /// Any other remote error
    Api,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Network => write!(f, "network"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::ProjectNotFound => write!(f, "project not found"),
            Self::Api => write!(f, "api"),
        }
    }
}

/// A global fetch failure that aborted a cycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct CycleFailure {
    /// What went wrong
    pub kind: FailureKind,
    /// Detail
    pub message: String,
}

impl CycleFailure {
    /// Create a failure
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a remote error
    pub fn from_source(err: &todosync_todoist::Error, context: &str) -> Self {
        use todosync_todoist::ErrorKind;

        let kind = match err.kind() {
            ErrorKind::Auth => FailureKind::Auth,
            ErrorKind::Network => FailureKind::Network,
            ErrorKind::RateLimited => FailureKind::RateLimited,
            ErrorKind::Other => FailureKind::Api,
        };
        Self::new(kind, format!("{}: {}", context, err))
    }
}

/// Stage at which a single task failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    /// Rendering the note
    Render,
    /// Writing the note
    Write,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => write!(f, "render"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// A per-task failure captured in the cycle result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task {task_id} ({stage}): {message}")]
pub struct TaskError {
    /// Task ID
    pub task_id: String,
    /// Failing stage
    pub stage: TaskStage,
    /// Detail
    pub message: String,
}

impl TaskError {
    /// Render failure for a task
    pub fn render(task_id: impl Into<String>, err: &RenderError) -> Self {
        Self {
            task_id: task_id.into(),
            stage: TaskStage::Render,
            message: err.to_string(),
        }
    }

    /// Write failure for a task
    pub fn write(task_id: impl Into<String>, err: &WriteError) -> Self {
        Self {
            task_id: task_id.into(),
            stage: TaskStage::Write,
            message: err.to_string(),
        }
    }
}

/// Trait for user-friendly error messages
///
/// Provides human-readable error messages, suggestions for fixing,
/// and links to documentation.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;

    /// Get a documentation URL for more information
    fn docs_url(&self) -> Option<&str> {
        None
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            ConfigError::MissingToken => "🔑 Todoist API token is not configured.".to_string(),
            ConfigError::OutputDir(e) => {
                format!("📁 Cannot write to output directory {}", e.path().display())
            }
            other => format!("⚙️ Configuration error: {}", other),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ConfigError::MissingToken => Some(
                "💡 Run `todosync init` or set the TODOIST_API_TOKEN environment variable."
                    .to_string(),
            ),
            ConfigError::InvalidTimeOfDay { .. } => {
                Some("💡 Use a 24-hour time such as 08:30 or 21:00.".to_string())
            }
            ConfigError::ZeroInterval => {
                Some("💡 Pass --interval with a value of at least 1 minute.".to_string())
            }
            ConfigError::IntervalTooLarge { .. } => Some(
                "💡 Use a shorter --interval, or --time for a daily sync.".to_string(),
            ),
            ConfigError::ZeroConcurrency => {
                Some("💡 Set sync.concurrency to 1 or more in todosync.toml.".to_string())
            }
            ConfigError::OutputDir(_) => Some(
                "💡 Check the directory permissions or choose another --output directory."
                    .to_string(),
            ),
        }
    }

    fn docs_url(&self) -> Option<&str> {
        match self {
            ConfigError::MissingToken => Some(TODOIST_API_DOCS),
            _ => None,
        }
    }
}

impl UserFriendlyError for CycleFailure {
    fn user_message(&self) -> String {
        match self.kind {
            FailureKind::Auth => "🔑 Todoist rejected the API token.".to_string(),
            FailureKind::Network => "🌐 Could not reach the Todoist API.".to_string(),
            FailureKind::RateLimited => {
                "⏳ Todoist rate limit exceeded. Please try again later.".to_string()
            }
            FailureKind::ProjectNotFound => format!("📂 {}", self.message),
            FailureKind::Api => format!("❌ Todoist API error: {}", self.message),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self.kind {
            FailureKind::Auth => Some(
                "💡 Copy a fresh token from Todoist Settings → Integrations → Developer."
                    .to_string(),
            ),
            FailureKind::Network => {
                Some("💡 Check your internet connection and firewall settings.".to_string())
            }
            FailureKind::RateLimited => {
                Some("💡 Use a longer --interval between syncs.".to_string())
            }
            FailureKind::ProjectNotFound => {
                Some("💡 Run `todosync list-projects` to see available names.".to_string())
            }
            FailureKind::Api => None,
        }
    }

    fn docs_url(&self) -> Option<&str> {
        match self.kind {
            FailureKind::Auth | FailureKind::RateLimited | FailureKind::Api => {
                Some(TODOIST_API_DOCS)
            }
            _ => None,
        }
    }
}

impl UserFriendlyError for TimingError {
    fn user_message(&self) -> String {
        format!("⏰ Scheduling error: {}", self)
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            TimingError::NoOccurrence { .. } => {
                Some("💡 Pick a daily time that exists in your local time zone.".to_string())
            }
            TimingError::OutOfRange => {
                Some("💡 Check the system clock and use a shorter --interval.".to_string())
            }
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &dyn UserFriendlyError) -> String {
    let mut output = String::new();

    output.push_str(&error.user_message());
    output.push_str("\n\n");

    if let Some(suggestion) = error.suggestion() {
        output.push_str(&suggestion);
        output.push_str("\n\n");
    }

    if let Some(url) = error.docs_url() {
        output.push_str(&format!("📚 More info: {}", url));
        output.push('\n');
    }

    output
}
