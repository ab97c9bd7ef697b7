//! Shutdown signalling
//!
//! A [`ShutdownHandle`] wraps a [`CancellationToken`]. The scheduler only
//! observes it between cycles, so a cycle in flight always finishes.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cloneable handle used to request a stop
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    /// Create a new handle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the scheduler to stop after the current cycle (idempotent)
    pub fn request(&self) {
        if self.token.is_cancelled() {
            debug!("Shutdown already requested");
            return;
        }
        info!("Shutdown requested");
        self.token.cancel();
    }

    /// Whether a stop has been requested
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a stop has been requested
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }

    /// Underlying token
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}

/// Forward the first OS shutdown signal to `handle`
///
/// The listener exits quietly if a stop is requested some other way first.
pub fn spawn_signal_listener(handle: ShutdownHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_shutdown_signal() => handle.request(),
            _ = handle.requested() => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_is_idempotent() {
        let handle = ShutdownHandle::new();
        assert!(!handle.is_requested());

        handle.request();
        handle.request();

        assert!(handle.is_requested());
        handle.requested().await;
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handle = ShutdownHandle::new();
        let other = handle.clone();
        let token = handle.token();

        other.request();

        assert!(handle.is_requested());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_signal_listener_exits_on_manual_request() {
        let handle = ShutdownHandle::new();
        let listener = spawn_signal_listener(handle.clone());

        handle.request();

        listener.await.unwrap();
    }
}
