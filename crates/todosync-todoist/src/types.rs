//! Todoist REST payload types
//!
//! Only the fields the exporter uses are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// A Todoist project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Color name (e.g. "berry_red")
    #[serde(default)]
    pub color: String,
    /// Shared with collaborators
    #[serde(default)]
    pub is_shared: bool,
    /// Marked as favorite
    #[serde(default)]
    pub is_favorite: bool,
    /// Web URL
    #[serde(default)]
    pub url: String,
}

impl Project {
    /// Create a project with the given id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Due date information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Due {
    /// Date in `YYYY-MM-DD` form
    pub date: String,
    /// Human-readable form ("every monday")
    #[serde(default)]
    pub string: String,
    /// Recurring due date
    #[serde(default)]
    pub is_recurring: bool,
    /// Exact due datetime, if set
    #[serde(default)]
    pub datetime: Option<String>,
    /// Timezone of `datetime`
    #[serde(default)]
    pub timezone: Option<String>,
}

/// A Todoist task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task ID
    pub id: String,
    /// Task title (markdown allowed)
    pub content: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Owning project ID
    pub project_id: String,
    /// Section ID
    #[serde(default)]
    pub section_id: Option<String>,
    /// Parent task ID for subtasks
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Sort order among siblings
    #[serde(default)]
    pub order: i64,
    /// Priority, 1 (none) to 4 (high)
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Label names
    #[serde(default)]
    pub labels: Vec<String>,
    /// Due date
    #[serde(default)]
    pub due: Option<Due>,
    /// Web URL
    #[serde(default)]
    pub url: String,
    /// Number of comments
    #[serde(default)]
    pub comment_count: u32,
    /// Completion flag
    #[serde(default)]
    pub is_completed: bool,
    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created_at: String,
    /// Creator user ID
    #[serde(default)]
    pub creator_id: String,
    /// Assignee user ID
    #[serde(default)]
    pub assignee_id: Option<String>,
    /// Assigner user ID
    #[serde(default)]
    pub assigner_id: Option<String>,
}

fn default_priority() -> u8 {
    1
}

impl Task {
    /// Create a task with the given id, content and project
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            project_id: project_id.into(),
            priority: default_priority(),
            ..Self::default()
        }
    }

    /// Due date as `YYYY-MM-DD`, if any
    pub fn due_date(&self) -> Option<&str> {
        self.due.as_ref().map(|d| d.date.as_str())
    }

    /// Priority as text (4 is the highest in the API)
    pub fn priority_text(&self) -> &'static str {
        match self.priority {
            4 => "High",
            3 => "Medium",
            2 => "Low",
            _ => "None",
        }
    }
}

/// A comment on a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID
    pub id: String,
    /// Task the comment belongs to
    #[serde(default)]
    pub task_id: String,
    /// Comment body (markdown)
    pub content: String,
    /// Posting timestamp (RFC 3339)
    pub posted_at: String,
    /// Attachment metadata
    #[serde(default)]
    pub attachment: Option<serde_json::Value>,
}
