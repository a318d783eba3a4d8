//! Dashboard Server
//!
//! Binds the dashboard router and serves it until shutdown.

use crate::dashboard::context::AppState;
use crate::dashboard::routes::DashboardRouter;
use crate::error::{Error, Result};
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the dashboard server
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// HTTP bind address
    pub bind_addr: SocketAddr,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

// =============================================================================
// Dashboard Server
// =============================================================================

pub struct DashboardServer {
    config: DashboardConfig,
    state: AppState,
    shutdown_tx: broadcast::Sender<()>,
}

impl DashboardServer {
    /// Create a new dashboard server
    pub fn new(config: DashboardConfig, state: AppState) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state,
            shutdown_tx,
        }
    }

    /// Run until the server stops or shutdown is triggered
    pub async fn run(&self) -> Result<()> {
        info!("Starting Manila dashboard");
        info!("  HTTP: {}", self.config.bind_addr);

        let handle = self.spawn_http_server();

        tokio::select! {
            result = handle => {
                match result {
                    Ok(Err(e)) => {
                        error!("HTTP server error: {}", e);
                        return Err(e);
                    }
                    Err(e) => {
                        error!("HTTP server task failed: {:?}", e);
                        return Err(Error::Internal(format!("HTTP server task failed: {}", e)));
                    }
                    Ok(Ok(())) => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt, shutting down");
                self.shutdown();
            }
        }

        Ok(())
    }

    fn spawn_http_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let addr = self.config.bind_addr;
        let state = self.state.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move { run_http_server(addr, state, shutdown_rx).await })
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn run_http_server(
    addr: SocketAddr,
    state: AppState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let app = DashboardRouter::new(state)
        .build()
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind dashboard server: {}", e)))?;

    info!("Dashboard listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Dashboard server shutting down");
        })
        .await
        .map_err(|e| Error::Internal(format!("Dashboard server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
