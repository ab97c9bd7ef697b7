//! Todoist REST client
//!
//! Thin wrapper over the Todoist REST v2 API. Every call maps transport and
//! HTTP failures onto [`Error`] so callers can tell auth, network and
//! rate-limit problems apart.

use crate::error::{Error, Result};
use crate::source::{TaskQuery, TaskSource};
use crate::types::{Comment, Project, Task};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default Todoist REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.todoist.com/rest/v2";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API token
pub const TOKEN_ENV_VAR: &str = "TODOIST_API_TOKEN";

const MAX_ERROR_BODY: usize = 300;

/// Client configuration
#[derive(Clone)]
pub struct TodoistConfig {
    /// Personal API token
    pub api_token: String,
    /// API base URL (no trailing slash)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl TodoistConfig {
    /// Create a configuration with the given token and default endpoint
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read the token from `TODOIST_API_TOKEN`
    pub fn from_env() -> Result<Self> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(Self::new(token)),
            _ => Err(Error::NotConfigured),
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for TodoistConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoistConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Todoist REST client
pub struct TodoistClient {
    client: Client,
    config: TodoistConfig,
}

impl TodoistClient {
    /// Create a new client
    pub fn new(config: TodoistConfig) -> Result<Self> {
        if config.api_token.trim().is_empty() {
            return Err(Error::NotConfigured);
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token.trim()))
            .map_err(|_| Error::Auth("api token contains invalid characters".to_string()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(TodoistConfig::from_env()?)
    }

    /// Base URL in use
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Check that the token is accepted by listing projects
    pub async fn test_connection(&self) -> Result<usize> {
        match self.list_projects().await {
            Ok(projects) => {
                info!(projects = projects.len(), "Connected to Todoist API");
                Ok(projects.len())
            }
            Err(e) => {
                warn!("Failed to connect to Todoist API: {}", e);
                Err(e)
            }
        }
    }

    /// GET `endpoint` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url, endpoint.trim_start_matches('/'));

        debug!(%url, ?query, "Todoist request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &body, retry_after));
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

/// Map a non-success status onto an error
fn status_error(status: StatusCode, body: &str, retry_after: Option<u64>) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Auth(format!("Todoist rejected the API token (HTTP {})", status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { retry_after },
        _ => Error::Api {
            status: status.as_u16(),
            message: truncate_body(body),
        },
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &body[..end])
}

#[async_trait::async_trait]
impl TaskSource for TodoistClient {
    #[instrument(skip(self))]
    async fn list_projects(&self) -> Result<Vec<Project>> {
        info!("Fetching projects from Todoist");
        self.get_json("projects", &[]).await
    }

    #[instrument(skip(self, query), fields(filter = ?query.filter, project_id = ?query.project_id))]
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(project_id) = query.project_id.as_deref() {
            params.push(("project_id", project_id));
        }
        if let Some(filter) = query.filter.as_deref() {
            params.push(("filter", filter));
        }

        info!("Fetching tasks from Todoist");
        self.get_json("tasks", &params).await
    }

    #[instrument(skip(self))]
    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>> {
        debug!("Fetching comments for task {}", task_id);
        self.get_json("comments", &[("task_id", task_id)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = TodoistConfig::new("secret")
            .with_base_url("http://localhost:8080/rest/v2/")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://localhost:8080/rest/v2");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TodoistConfig::new("super-secret-token");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = TodoistClient::new(TodoistConfig::new("   "));
        assert!(matches!(result, Err(Error::NotConfigured)));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "", None),
            Error::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "", None),
            Error::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "", Some(12)),
            Error::RateLimited {
                retry_after: Some(12)
            }
        ));
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "oops", None) {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncate_body() {
        let long = "é".repeat(400);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("...(truncated)"));
        assert!(truncated.len() < long.len());
        assert_eq!(truncate_body("  short  "), "short");
    }
}
