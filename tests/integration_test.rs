//! Integration tests for todosync
//!
//! These tests wire the crates together the way the binary does:
//! - todosync-todoist: the HTTP client, against a local mock server
//! - todosync-notes: the real renderer and file writer, on a temp directory
//! - todosync-core: the sync cycle driven through the scheduler

use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use todosync_core::{
    ConfigError, ExitOutcome, FailureKind, OutcomeStatus, ProjectScope, Scheduler,
    SyncConfiguration, SyncCycle, TimingMode,
};
use todosync_notes::{ExportSettings, FsNoteWriter, MarkdownRenderer};
use todosync_todoist::{TodoistClient, TodoistConfig};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn scheduler_for(server: &MockServer, settings: &ExportSettings) -> Scheduler {
    let client = TodoistClient::new(
        TodoistConfig::new("integration-token")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(2)),
    )
    .expect("client should build");

    let cycle = SyncCycle::new(
        Arc::new(client),
        Arc::new(MarkdownRenderer::new(settings.clone())),
        Arc::new(FsNoteWriter::new()),
    );
    Scheduler::new(cycle)
}

async fn mount_workspace(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("authorization", "Bearer integration-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "Work", "color": "blue" },
            { "id": "p2", "name": "Home", "color": "green" }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "100",
                "content": "Quarterly report",
                "description": "Numbers for Q3",
                "project_id": "p1",
                "order": 1,
                "priority": 4,
                "labels": ["finance"],
                "comment_count": 1,
                "due": { "date": "2024-10-01", "string": "Oct 1", "is_recurring": false },
                "url": "https://todoist.com/showTask?id=100",
                "created_at": "2024-09-01T08:00:00Z"
            },
            {
                "id": "101",
                "content": "Collect invoices",
                "project_id": "p1",
                "parent_id": "100",
                "order": 2,
                "created_at": "2024-09-01T08:05:00Z"
            },
            {
                "id": "200",
                "content": "Water plants",
                "project_id": "p2",
                "order": 1,
                "created_at": "2024-09-02T07:00:00Z"
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("task_id", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "c1",
                "task_id": "100",
                "content": "Draft shared",
                "posted_at": "2024-09-03T15:30:00Z"
            }
        ])))
        .mount(server)
        .await;
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

// ============================================================================
// Export (single cycle)
// ============================================================================

#[tokio::test]
async fn test_export_writes_one_note_per_task() {
    let server = MockServer::start().await;
    mount_workspace(&server).await;

    let dir = TempDir::new().unwrap();
    let settings = ExportSettings::new(dir.path().join("vault"));
    let scheduler = scheduler_for(&server, &settings);
    let config = SyncConfiguration::new(settings.clone());

    let result = assert_ok!(scheduler.run_once(&config).await);

    assert!(result.success, "{:?}", result);
    assert_eq!(result.written, 3);

    let parent = read(&settings.output_dir.join("100.md"));
    assert!(parent.starts_with("---\ntitle: \"Quarterly report\"\n"));
    assert!(parent.contains("project: \"Work\"\n"));
    assert!(parent.contains("due_date: \"2024-10-01\"\n"));
    assert!(parent.contains("## Description\n\nNumbers for Q3\n"));
    assert!(parent.contains("- [ ] Collect invoices"));
    assert!(parent.contains("## Comments"));
    assert!(parent.contains("Draft shared"));

    assert!(settings.output_dir.join("101.md").exists());
    assert!(settings.output_dir.join("200.md").exists());

    let state = scheduler.status().snapshot();
    assert_eq!(state.run_count, 1);
    assert_eq!(state.last_outcome.unwrap().status, OutcomeStatus::Success);
}

#[tokio::test]
async fn test_export_is_idempotent() {
    let server = MockServer::start().await;
    mount_workspace(&server).await;

    let dir = TempDir::new().unwrap();
    let settings = ExportSettings::new(dir.path()).with_comments(false);
    let scheduler = scheduler_for(&server, &settings);
    let config = SyncConfiguration::new(settings.clone());

    assert_ok!(scheduler.run_once(&config).await);
    let first = read(&dir.path().join("200.md"));
    assert_ok!(scheduler.run_once(&config).await);
    let second = read(&dir.path().join("200.md"));

    assert_eq!(first, second);
    assert_eq!(scheduler.status().snapshot().run_count, 2);
}

#[tokio::test]
async fn test_project_folders_layout() {
    let server = MockServer::start().await;
    mount_workspace(&server).await;

    let dir = TempDir::new().unwrap();
    let settings = ExportSettings::new(dir.path())
        .with_comments(false)
        .with_project_folders(true);
    let scheduler = scheduler_for(&server, &settings);

    assert_ok!(scheduler.run_once(&SyncConfiguration::new(settings)).await);

    assert!(dir.path().join("Work").join("100.md").exists());
    assert!(dir.path().join("Home").join("200.md").exists());
}

#[tokio::test]
async fn test_unknown_project_name_fails_cycle() {
    let server = MockServer::start().await;
    mount_workspace(&server).await;

    let dir = TempDir::new().unwrap();
    let settings = ExportSettings::new(dir.path()).with_comments(false);
    let scheduler = scheduler_for(&server, &settings);
    let config = SyncConfiguration::new(settings)
        .with_project(ProjectScope::Name("Garden".into()));

    let result = assert_ok!(scheduler.run_once(&config).await);

    assert!(!result.success);
    assert_eq!(result.failure.unwrap().kind, FailureKind::ProjectNotFound);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_rejected_token_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let settings = ExportSettings::new(dir.path());
    let scheduler = scheduler_for(&server, &settings);

    let result = assert_ok!(scheduler.run_once(&SyncConfiguration::new(settings)).await);

    assert_eq!(result.failure.unwrap().kind, FailureKind::Auth);
    assert_eq!(scheduler.status().snapshot().failure_count, 1);
}

#[tokio::test]
async fn test_output_root_that_is_a_file_is_rejected() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();
    let settings = ExportSettings::new(&blocker);
    let scheduler = scheduler_for(&server, &settings);

    let err = assert_err!(scheduler.run_once(&SyncConfiguration::new(settings)).await);
    assert!(matches!(err, ConfigError::OutputDir(_)));
}

// ============================================================================
// Scheduler
// ============================================================================

#[tokio::test]
async fn test_schedule_once_then_clean_exit() {
    let server = MockServer::start().await;
    mount_workspace(&server).await;

    let dir = TempDir::new().unwrap();
    let settings = ExportSettings::new(dir.path());
    let scheduler = scheduler_for(&server, &settings);
    let config = SyncConfiguration::new(settings)
        .with_timing(TimingMode::Daily("07:00".into()))
        .with_once(true);

    let outcome = scheduler.start(&config).await;

    assert!(matches!(outcome, ExitOutcome::CleanShutdown));
    let state = scheduler.status().snapshot();
    assert_eq!(state.run_count, 1);
    assert!(state.stopped);
    assert!(dir.path().join("100.md").exists());
}

#[tokio::test]
async fn test_schedule_stops_on_request() {
    let server = MockServer::start().await;
    mount_workspace(&server).await;

    let dir = TempDir::new().unwrap();
    let settings = ExportSettings::new(dir.path()).with_comments(false);
    let scheduler = Arc::new(scheduler_for(&server, &settings));
    let config = SyncConfiguration::new(settings)
        .with_timing(TimingMode::Interval(Duration::from_secs(3600)));

    let mut status = scheduler.status();
    let handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.start(&config).await })
    };

    // wait for the immediate first cycle to finish
    while status.snapshot().run_count == 0 {
        assert!(status.changed().await);
    }
    scheduler.request_shutdown();

    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler should stop promptly")
        .unwrap();

    assert!(outcome.is_clean());
    assert_eq!(scheduler.status().snapshot().run_count, 1);
}
