//! Markdown note rendering
//!
//! Rendering is pure: a [`NoteInput`] goes in, a [`RenderedNote`] (target path
//! plus full file content) comes out. Nothing touches the file system here.

use crate::error::RenderError;
use crate::format::{format_yaml_string, sanitize_filename, tag_segment};
use crate::settings::ExportSettings;
use chrono::DateTime;
use std::path::PathBuf;
use todosync_todoist::{Comment, Project, Task};

/// Everything needed to render one task note
#[derive(Debug, Clone, PartialEq)]
pub struct NoteInput {
    /// The task itself
    pub task: Task,
    /// Project the task belongs to
    pub project: Project,
    /// Comments, already fetched (may be empty)
    pub comments: Vec<Comment>,
    /// Direct subtasks, any order
    pub subtasks: Vec<Task>,
}

impl NoteInput {
    /// Input with no comments and no subtasks
    pub fn new(task: Task, project: Project) -> Self {
        Self {
            task,
            project,
            comments: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    /// Attach comments
    #[must_use]
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    /// Attach subtasks
    #[must_use]
    pub fn with_subtasks(mut self, subtasks: Vec<Task>) -> Self {
        self.subtasks = subtasks;
        self
    }
}

/// A rendered note ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    /// Destination path
    pub path: PathBuf,
    /// Full file content
    pub content: String,
}

/// Turns tasks into note files
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait NoteRenderer: Send + Sync {
    /// Render a task note
    fn render(&self, input: &NoteInput) -> Result<RenderedNote, RenderError>;
}

/// Obsidian-flavoured markdown renderer
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    settings: ExportSettings,
}

impl MarkdownRenderer {
    /// Create a renderer for the given settings
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Settings in use
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Where the note for `task` lives
    pub fn note_path(&self, task: &Task, project: &Project) -> Result<PathBuf, RenderError> {
        if task.id.trim().is_empty() {
            return Err(RenderError::MissingTaskId);
        }

        let mut dir = self.settings.output_dir.clone();
        if self.settings.project_folders {
            dir.push(sanitize_filename(&project.name));
        }
        Ok(dir.join(format!("{}.md", sanitize_filename(&task.id))))
    }

    /// Tags for a task, each starting with `#`
    pub fn tags(&self, task: &Task, project: &Project) -> Vec<String> {
        let prefix = &self.settings.tag_prefix;
        let mut tags = vec![
            format!("#{prefix}"),
            format!("#{prefix}/{}", tag_segment(&project.name)),
        ];

        if self.settings.priority_as_tags && task.priority > 1 {
            tags.push(format!(
                "#{prefix}/priority/{}",
                task.priority_text().to_lowercase()
            ));
        }

        if self.settings.labels_as_tags {
            tags.extend(
                task.labels
                    .iter()
                    .map(|label| format!("#{prefix}/label/{}", tag_segment(label))),
            );
        }

        let status = if task.is_completed { "completed" } else { "active" };
        tags.push(format!("#{prefix}/status/{status}"));

        tags
    }

    fn frontmatter(&self, task: &Task, project: &Project) -> Vec<String> {
        let mut lines = vec![
            "---".to_string(),
            format!("title: {}", format_yaml_string(&task.content)),
            format!("todoist_id: {}", format_yaml_string(&task.id)),
            format!("project: {}", format_yaml_string(&project.name)),
            format!("project_id: {}", format_yaml_string(&project.id)),
            format!("created: {}", format_yaml_string(&task.created_at)),
        ];

        if let Some(due) = task.due_date() {
            lines.push(format!("due_date: {}", format_yaml_string(due)));
        }

        lines.push(format!("priority: {}", task.priority));
        lines.push(format!("priority_text: \"{}\"", task.priority_text()));

        if !task.labels.is_empty() {
            lines.push(format!("labels: {}", yaml_list(task.labels.iter())));
        }

        lines.push(format!("completed: {}", task.is_completed));

        if !task.url.is_empty() {
            lines.push(format!("todoist_url: {}", format_yaml_string(&task.url)));
        }

        let tags = self.tags(task, project);
        let bare = tags.iter().map(|t| t.trim_start_matches('#'));
        lines.push(format!("tags: {}", yaml_list(bare)));

        lines.push("---".to_string());
        lines.push(String::new());
        lines
    }
}

fn yaml_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted: Vec<String> = items
        .into_iter()
        .map(|s| format_yaml_string(s.as_ref()))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// `2024-01-11T15:30:00Z` → `11 Jan 15:30`
fn format_comment_time(comment: &Comment) -> Result<String, RenderError> {
    DateTime::parse_from_rfc3339(comment.posted_at.trim())
        .map(|dt| dt.format("%d %b %H:%M").to_string())
        .map_err(|_| RenderError::InvalidTimestamp {
            comment_id: comment.id.clone(),
            value: comment.posted_at.clone(),
        })
}

impl NoteRenderer for MarkdownRenderer {
    fn render(&self, input: &NoteInput) -> Result<RenderedNote, RenderError> {
        let task = &input.task;
        let project = &input.project;
        let path = self.note_path(task, project)?;

        let mut lines = self.frontmatter(task, project);

        let icon = if task.is_completed { "✅" } else { "⬜" };
        lines.push(format!("# {icon} {}", task.content));
        lines.push(String::new());

        if !task.description.trim().is_empty() {
            lines.push("## Description".to_string());
            lines.push(String::new());
            lines.push(task.description.trim_end().to_string());
            lines.push(String::new());
        }

        if !input.subtasks.is_empty() {
            let mut subtasks: Vec<&Task> = input.subtasks.iter().collect();
            subtasks.sort_by_key(|t| t.order);

            lines.push("## Subtasks".to_string());
            lines.push(String::new());
            for sub in subtasks {
                let checkbox = if sub.is_completed { "[x]" } else { "[ ]" };
                lines.push(format!("- {checkbox} {}", sub.content));
            }
            lines.push(String::new());
        }

        if self.settings.include_comments && !input.comments.is_empty() {
            lines.push("## Comments".to_string());
            lines.push(String::new());
            for comment in &input.comments {
                let when = format_comment_time(comment)?;
                lines.push(format!("* {when} - {}", comment.content));
            }
        }

        let mut content = lines.join("\n");
        let trimmed = content.trim_end_matches('\n').len();
        content.truncate(trimmed);
        content.push('\n');

        Ok(RenderedNote { path, content })
    }
}
