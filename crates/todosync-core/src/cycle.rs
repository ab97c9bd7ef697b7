//! Sync cycle
//!
//! One fetch → render → write pass over every task in scope:
//! - Listing projects or tasks fails → the whole cycle fails, nothing is written
//! - Rendering or writing one task fails → recorded, the other tasks continue
//! - Fetching comments fails → the note is written without them, with a warning

use crate::config::{ProjectScope, SyncConfiguration};
use crate::error::{CycleFailure, FailureKind, TaskError};
use crate::scheduler::{Clock, SystemClock};
use chrono::{DateTime, Local};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use todosync_notes::{NoteInput, NoteRenderer, NoteWriter};
use todosync_todoist::{Comment, Project, Task, TaskQuery, TaskSource};
use tracing::{debug, error, info, warn};

/// A non-fatal problem encountered during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWarning {
    /// Task the warning refers to
    pub task_id: String,
    /// Detail
    pub message: String,
}

/// Outcome of one sync cycle
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// When the cycle started
    pub started_at: DateTime<Local>,
    /// When the cycle finished
    pub finished_at: DateTime<Local>,
    /// Tasks returned by the source
    pub fetched: usize,
    /// Tasks attempted (rendered and written, or failed)
    pub processed: usize,
    /// Notes written
    pub written: usize,
    /// Tasks excluded (completed, or unknown project)
    pub skipped: usize,
    /// Per-task failures
    pub errors: Vec<TaskError>,
    /// Non-fatal problems
    pub warnings: Vec<TaskWarning>,
    /// Global failure that aborted the cycle
    pub failure: Option<CycleFailure>,
    /// No global failure and no per-task error
    pub success: bool,
}

impl SyncResult {
    fn aborted(
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        failure: CycleFailure,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            fetched: 0,
            processed: 0,
            written: 0,
            skipped: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            failure: Some(failure),
            success: false,
        }
    }

    /// One-line summary for logs and the status panel
    pub fn summary(&self) -> String {
        if let Some(failure) = &self.failure {
            return failure.to_string();
        }
        let mut summary = format!("{} written", self.written);
        if !self.errors.is_empty() {
            summary.push_str(&format!(", {} failed", self.errors.len()));
        }
        if self.skipped > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped));
        }
        if !self.warnings.is_empty() {
            summary.push_str(&format!(", {} warnings", self.warnings.len()));
        }
        summary
    }

    /// Wall time of the cycle
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

struct TaskReport {
    task_id: String,
    written: Option<PathBuf>,
    error: Option<TaskError>,
    warning: Option<TaskWarning>,
}

/// Orchestrates one fetch → render → write pass
#[derive(Clone)]
pub struct SyncCycle {
    source: Arc<dyn TaskSource>,
    renderer: Arc<dyn NoteRenderer>,
    writer: Arc<dyn NoteWriter>,
    clock: Arc<dyn Clock>,
}

impl SyncCycle {
    /// Create a cycle from its collaborators
    pub fn new(
        source: Arc<dyn TaskSource>,
        renderer: Arc<dyn NoteRenderer>,
        writer: Arc<dyn NoteWriter>,
    ) -> Self {
        Self {
            source,
            renderer,
            writer,
            clock: Arc::new(SystemClock),
        }
    }

    /// Stamp results with a different wall clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one cycle; never fails, every problem lands in the result
    pub async fn execute(&self, config: &SyncConfiguration) -> SyncResult {
        let started_at = self.clock.now();

        let projects = match self.source.list_projects().await {
            Ok(projects) => projects,
            Err(e) => {
                error!("Failed to list projects: {}", e);
                return SyncResult::aborted(
                    started_at,
                    self.clock.now(),
                    CycleFailure::from_source(&e, "listing projects"),
                );
            }
        };

        let project_id = match resolve_scope(&config.project, &projects) {
            Ok(id) => id,
            Err(failure) => {
                error!("{}", failure);
                return SyncResult::aborted(started_at, self.clock.now(), failure);
            }
        };

        let query = TaskQuery {
            filter: config.filter.clone(),
            project_id,
        };
        let tasks = match self.source.list_tasks(&query).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("Failed to list tasks: {}", e);
                return SyncResult::aborted(
                    started_at,
                    self.clock.now(),
                    CycleFailure::from_source(&e, "listing tasks"),
                );
            }
        };

        let fetched = tasks.len();
        info!(fetched, "Fetched tasks from Todoist");

        let projects_by_id: HashMap<&str, &Project> =
            projects.iter().map(|p| (p.id.as_str(), p)).collect();
        let subtasks = group_subtasks(&tasks);

        let mut skipped = 0;
        let mut warnings = Vec::new();
        let mut work = Vec::new();

        for task in &tasks {
            if task.is_completed && !config.include_completed {
                debug!(task_id = %task.id, "Skipping completed task");
                skipped += 1;
                continue;
            }
            let Some(project) = projects_by_id.get(task.project_id.as_str()) else {
                warn!(task_id = %task.id, project_id = %task.project_id, "Project not found for task");
                warnings.push(TaskWarning {
                    task_id: task.id.clone(),
                    message: format!("project {} not found", task.project_id),
                });
                skipped += 1;
                continue;
            };
            let children = subtasks.get(task.id.as_str()).cloned().unwrap_or_default();
            work.push(NoteInput::new(task.clone(), (*project).clone()).with_subtasks(children));
        }

        let rate_limited = AtomicBool::new(false);
        let include_comments = config.export.include_comments;
        let reports: Vec<TaskReport> = stream::iter(work)
            .map(|input| self.process_task(input, include_comments, &rate_limited))
            .buffer_unordered(config.concurrency.max(1))
            .collect()
            .await;

        let processed = reports.len();
        let mut written = 0;
        let mut errors = Vec::new();
        for report in reports {
            if let Some(path) = report.written {
                debug!(task_id = %report.task_id, path = %path.display(), "Exported task");
                written += 1;
            }
            if let Some(err) = report.error {
                errors.push(err);
            }
            if let Some(warning) = report.warning {
                warnings.push(warning);
            }
        }

        let result = SyncResult {
            started_at,
            finished_at: self.clock.now(),
            fetched,
            processed,
            written,
            skipped,
            success: errors.is_empty(),
            errors,
            warnings,
            failure: None,
        };

        info!(
            fetched = result.fetched,
            written = result.written,
            skipped = result.skipped,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Sync cycle finished"
        );
        result
    }

    async fn process_task(
        &self,
        input: NoteInput,
        include_comments: bool,
        rate_limited: &AtomicBool,
    ) -> TaskReport {
        let task_id = input.task.id.clone();
        let mut warning = None;

        let comments = if include_comments && input.task.comment_count > 0 {
            match self.fetch_comments(&task_id, rate_limited).await {
                Ok(comments) => comments,
                Err(message) => {
                    warn!(task_id = %task_id, "Writing note without comments: {}", message);
                    warning = Some(TaskWarning {
                        task_id: task_id.clone(),
                        message,
                    });
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let input = input.with_comments(comments);
        let note = match self.renderer.render(&input) {
            Ok(note) => note,
            Err(e) => {
                error!(task_id = %task_id, "Failed to render task: {}", e);
                return TaskReport {
                    error: Some(TaskError::render(&task_id, &e)),
                    task_id,
                    written: None,
                    warning,
                };
            }
        };

        match self.writer.write(&note.path, &note.content).await {
            Ok(()) => TaskReport {
                task_id,
                written: Some(note.path),
                error: None,
                warning,
            },
            Err(e) => {
                error!(task_id = %task_id, "Failed to write note: {}", e);
                TaskReport {
                    error: Some(TaskError::write(&task_id, &e)),
                    task_id,
                    written: None,
                    warning,
                }
            }
        }
    }

    /// Comments for a task; once rate limited, no further requests this cycle
    async fn fetch_comments(
        &self,
        task_id: &str,
        rate_limited: &AtomicBool,
    ) -> Result<Vec<Comment>, String> {
        if rate_limited.load(Ordering::SeqCst) {
            return Err("comments skipped: rate limited earlier in this cycle".to_string());
        }

        match self.source.list_comments(task_id).await {
            Ok(comments) => Ok(comments),
            Err(e) => {
                if e.is_rate_limited() {
                    rate_limited.store(true, Ordering::SeqCst);
                }
                Err(format!("failed to fetch comments: {}", e))
            }
        }
    }
}

/// Map the configured scope to a project id filter
fn resolve_scope(scope: &ProjectScope, projects: &[Project]) -> Result<Option<String>, CycleFailure> {
    match scope {
        ProjectScope::All => Ok(None),
        ProjectScope::Id(id) => Ok(Some(id.clone())),
        ProjectScope::Name(name) => projects
            .iter()
            .find(|p| p.name.to_lowercase() == name.to_lowercase())
            .map(|p| Some(p.id.clone()))
            .ok_or_else(|| {
                CycleFailure::new(
                    FailureKind::ProjectNotFound,
                    format!("project '{}' not found", name),
                )
            }),
    }
}

/// Children of each task present in the fetched set, keyed by parent id
fn group_subtasks(tasks: &[Task]) -> HashMap<&str, Vec<Task>> {
    let ids: std::collections::HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut groups: HashMap<&str, Vec<Task>> = HashMap::new();
    for task in tasks {
        if let Some(parent) = task.parent_id.as_deref() {
            if let Some(key) = ids.get(parent) {
                groups.entry(*key).or_default().push(task.clone());
            }
        }
    }
    groups
}
