//! Error types for todosync-todoist

use thiserror::Error;

/// Todoist error type
#[derive(Debug, Error)]
pub enum Error {
    /// No API token configured
    #[error("api token not configured")]
    NotConfigured,

    /// Token rejected (HTTP 401/403) or unusable
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the client timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded (HTTP 429)
    #[error("rate limit exceeded")]
    RateLimited {
        /// Seconds until retry is allowed, from `Retry-After`
        retry_after: Option<u64>,
    },

    /// Any other non-success status
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response message (truncated)
        message: String,
    },

    /// Body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse classification used by the sync engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials missing or rejected
    Auth,
    /// Transport failure or timeout
    Network,
    /// Server asked us to back off
    RateLimited,
    /// Anything else (bad status, bad payload)
    Other,
}

impl Error {
    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotConfigured | Error::Auth(_) => ErrorKind::Auth,
            Error::Network(_) | Error::Timeout(_) => ErrorKind::Network,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::Api { .. } | Error::InvalidResponse(_) => ErrorKind::Other,
        }
    }

    /// Whether this error means the caller should stop issuing requests for now
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::RateLimited
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(Error::NotConfigured.kind(), ErrorKind::Auth);
        assert_eq!(Error::Auth("bad token".into()).kind(), ErrorKind::Auth);
        assert_eq!(Error::Network("refused".into()).kind(), ErrorKind::Network);
        assert_eq!(Error::Timeout(30_000).kind(), ErrorKind::Network);
        assert_eq!(
            Error::RateLimited { retry_after: Some(5) }.kind(),
            ErrorKind::RateLimited
        );
        assert_eq!(
            Error::Api {
                status: 500,
                message: "boom".into()
            }
            .kind(),
            ErrorKind::Other
        );
        assert!(Error::RateLimited { retry_after: None }.is_rate_limited());
        assert!(!Error::Network("x".into()).is_rate_limited());
    }

    #[test]
    fn test_error_display() {
        let err = Error::Api {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "api error (404): not found");
        assert_eq!(Error::Timeout(1500).to_string(), "timeout after 1500ms");
    }
}
