//! Application configuration types
//!
//! Deserialized from the layered sources in [`loader`]; CLI flags are applied
//! on top when a command builds its [`SyncConfiguration`].

pub mod loader;

pub use loader::load_config;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use todosync_core::{SyncConfiguration, TimingMode, DEFAULT_CONCURRENCY};
use todosync_notes::{ExportSettings, DEFAULT_OUTPUT_DIR, DEFAULT_TAG_PREFIX};
use todosync_todoist::{TodoistConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub todoist: TodoistSection,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub sync: SyncSection,
}

/// `[todoist]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoistSection {
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TodoistSection {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl TodoistSection {
    /// Client configuration for `token`
    pub fn client_config(&self, token: impl Into<String>) -> TodoistConfig {
        TodoistConfig::new(token)
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// `[export]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSection {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub include_completed: bool,
    #[serde(default = "default_true")]
    pub include_comments: bool,
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
    #[serde(default = "default_true")]
    pub priority_as_tags: bool,
    #[serde(default = "default_true")]
    pub labels_as_tags: bool,
    #[serde(default)]
    pub project_folders: bool,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            include_completed: false,
            include_comments: true,
            tag_prefix: default_tag_prefix(),
            priority_as_tags: true,
            labels_as_tags: true,
            project_folders: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}
fn default_tag_prefix() -> String {
    DEFAULT_TAG_PREFIX.to_string()
}
fn default_true() -> bool {
    true
}

impl ExportSection {
    pub fn settings(&self) -> ExportSettings {
        ExportSettings::new(&self.output_dir)
            .with_comments(self.include_comments)
            .with_tag_prefix(self.tag_prefix.clone())
            .with_project_folders(self.project_folders)
            .with_metadata_tags(self.priority_as_tags, self.labels_as_tags)
    }
}

/// `[sync]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// Daily `HH:MM`; takes precedence over the interval
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default = "default_true")]
    pub run_immediately: bool,
    #[serde(default = "default_true")]
    pub show_status: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            interval_minutes: default_interval_minutes(),
            time: None,
            run_immediately: true,
            show_status: true,
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}
fn default_interval_minutes() -> u64 {
    15
}

impl SyncSection {
    pub fn timing(&self) -> TimingMode {
        match &self.time {
            Some(at) => TimingMode::Daily(at.clone()),
            None => TimingMode::every_minutes(self.interval_minutes),
        }
    }
}

impl AppConfig {
    /// Sync configuration from file/env values only
    pub fn sync_configuration(&self) -> SyncConfiguration {
        SyncConfiguration::new(self.export.settings())
            .with_completed(self.export.include_completed)
            .with_concurrency(self.sync.concurrency)
            .with_timing(self.sync.timing())
            .with_run_immediately(self.sync.run_immediately)
            .with_status(self.sync.show_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let config = AppConfig::default().sync_configuration();
        assert_eq!(config.export, ExportSettings::default());
        assert_eq!(config.timing, TimingMode::default());
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(!config.include_completed);
        assert!(config.run_immediately);
    }

    #[test]
    fn test_daily_time_overrides_interval() {
        let sync = SyncSection {
            time: Some("07:30".into()),
            ..SyncSection::default()
        };
        assert_eq!(sync.timing(), TimingMode::Daily("07:30".into()));
    }
}
