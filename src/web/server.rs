//! Web server for Filebox.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::{FileboxError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// HTTP server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    cors_origins: Vec<String>,
    max_body_bytes: usize,
    session_cleanup_interval: Duration,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, app_state: Arc<AppState>) -> Result<Self> {
        let addr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .map_err(|e| FileboxError::Config(format!("invalid web address: {e}")))?;

        Ok(Self {
            addr,
            app_state,
            cors_origins: config.web.cors_origins.clone(),
            max_body_bytes: config.files.max_upload_bytes(),
            session_cleanup_interval: Duration::from_secs(
                config.session.cleanup_interval_secs.max(1),
            ),
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the expired-session purge task.
    ///
    /// Lookups already ignore expired rows; this only reclaims space.
    fn start_session_cleanup_task(sessions: SessionStore, every: Duration) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match sessions.purge_expired().await {
                    Ok(0) => tracing::debug!("No expired sessions to clean up"),
                    Ok(count) => {
                        tracing::info!(deleted_count = count, "Cleaned up expired sessions")
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to clean up sessions"),
                }
            }
        });
    }

    async fn bind(self) -> std::io::Result<(TcpListener, axum::Router)> {
        let sessions = self.app_state.sessions.clone();
        let router = create_router(self.app_state, &self.cors_origins, self.max_body_bytes);

        let listener = TcpListener::bind(self.addr).await?;

        Self::start_session_cleanup_task(sessions, self.session_cleanup_interval);
        tracing::info!(
            interval_secs = self.session_cleanup_interval.as_secs(),
            "Session cleanup task started"
        );

        tracing::info!("Web server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Serve until `shutdown` completes, then drain in-flight requests.
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (listener, router) = self.bind().await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Serve in the background and return the bound address.
    ///
    /// Useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
