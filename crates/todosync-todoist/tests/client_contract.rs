//! Todoist client contract tests
//!
//! Verify request shape (auth header, query parameters) and the mapping of
//! HTTP responses onto classified errors, against a local mock server.

use serde_json::json;
use std::time::Duration;
use todosync_todoist::{Error, ErrorKind, TaskQuery, TaskSource, TodoistClient, TodoistConfig};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> TodoistClient {
    let config = TodoistConfig::new("test-token")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(2));
    TodoistClient::new(config).expect("client should build")
}

#[tokio::test]
async fn test_list_projects_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "Inbox", "color": "grey" },
            { "id": "p2", "name": "Work", "color": "blue", "is_shared": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).list_projects().await.unwrap();

    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].name, "Work");
    assert!(projects[1].is_shared);
}

#[tokio::test]
async fn test_list_tasks_passes_filter_and_project() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("project_id", "p1"))
        .and(query_param("filter", "today | overdue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "t1",
                "content": "Write report",
                "project_id": "p1",
                "order": 1,
                "priority": 4,
                "labels": ["work"],
                "comment_count": 2,
                "created_at": "2024-01-10T10:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = TaskQuery::all()
        .with_project("p1")
        .with_filter("today | overdue");
    let tasks = client_for(&server).list_tasks(&query).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].labels, vec!["work".to_string()]);
    assert_eq!(tasks[0].comment_count, 2);
}

#[tokio::test]
async fn test_list_comments_uses_task_id_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("task_id", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c1", "task_id": "t1", "content": "First", "posted_at": "2024-01-11T15:30:00Z" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let comments = client_for(&server).list_comments("t1").await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "First");
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_projects().await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_tasks(&TaskQuery::all())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after: Some(17)
        }
    ));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_projects().await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_projects().await.unwrap_err();

    assert!(matches!(err, Error::InvalidResponse(_)));
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[tokio::test]
async fn test_unreachable_server_maps_to_network_error() {
    // Nothing listens on port 9 (discard) on a test machine.
    let config = TodoistConfig::new("test-token")
        .with_base_url("http://127.0.0.1:9")
        .with_timeout(Duration::from_secs(2));
    let client = TodoistClient::new(config).unwrap();

    let err = client.list_projects().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_connection_reports_project_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "Inbox" }
        ])))
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).test_connection().await.unwrap(), 1);
}
