//! Export settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default output directory (relative to the working directory)
pub const DEFAULT_OUTPUT_DIR: &str = "obsidian_export";

/// Default tag prefix
pub const DEFAULT_TAG_PREFIX: &str = "todoist";

/// How notes are laid out and tagged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Root directory for notes
    pub output_dir: PathBuf,
    /// Render the comments section
    pub include_comments: bool,
    /// Prefix for generated tags (`#todoist/...`)
    pub tag_prefix: String,
    /// Emit `#<prefix>/priority/<name>` tags
    pub priority_as_tags: bool,
    /// Emit `#<prefix>/label/<label>` tags
    pub labels_as_tags: bool,
    /// Place notes in one folder per project
    pub project_folders: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            include_comments: true,
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
            priority_as_tags: true,
            labels_as_tags: true,
            project_folders: false,
        }
    }
}

impl ExportSettings {
    /// Settings writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Toggle the comments section
    #[must_use]
    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    /// Set the tag prefix
    #[must_use]
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    /// Toggle one folder per project
    #[must_use]
    pub fn with_project_folders(mut self, enabled: bool) -> Self {
        self.project_folders = enabled;
        self
    }

    /// Toggle priority and label tags together
    #[must_use]
    pub fn with_metadata_tags(mut self, priority: bool, labels: bool) -> Self {
        self.priority_as_tags = priority;
        self.labels_as_tags = labels;
        self
    }
}
