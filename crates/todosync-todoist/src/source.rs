//! Task source abstraction
//!
//! The sync cycle only talks to Todoist through [`TaskSource`], so tests can
//! substitute a fake or a `MockTaskSource`.

use crate::error::Result;
use crate::types::{Comment, Project, Task};

/// Filter for listing tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Todoist filter expression (e.g. "today", "@urgent")
    pub filter: Option<String>,
    /// Restrict to a single project
    pub project_id: Option<String>,
}

impl TaskQuery {
    /// Query matching every active task
    pub fn all() -> Self {
        Self::default()
    }

    /// Set the filter expression
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Restrict to a project
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

/// Remote source of projects, tasks and comments
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait TaskSource: Send + Sync {
    /// List all projects
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// List active tasks matching the query
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>>;

    /// List comments on a task
    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>>;
}
