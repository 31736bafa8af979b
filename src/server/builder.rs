//! RelayServerBuilder for a fluent API to build the relay server

use super::exposure::RelayExposure;
use super::host::RelayHost;
use crate::config::RelayConfig;
use crate::core::error::RelayError;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the relay HTTP + WebSocket server
///
/// # Example
///
/// ```ignore
/// RelayServerBuilder::new()
///     .with_config(RelayConfig::load()?)
///     .serve()
///     .await?;
/// ```
#[derive(Default)]
pub struct RelayServerBuilder {
    config: Option<RelayConfig>,
}

impl RelayServerBuilder {
    /// Create a new builder using the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration
    pub fn with_config(mut self, config: RelayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the shared host
    ///
    /// Fails if the configuration does not validate.
    pub fn build_host(self) -> Result<RelayHost> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(RelayHost::new(config))
    }

    /// Build the final router
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        Ok(RelayExposure::build_router(host))
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let host = Arc::new(self.build_host()?);
        let addr = host.config.bind_addr();
        let listener = TcpListener::bind(&addr).await.map_err(RelayError::Io)?;

        tracing::info!(
            address = %listener.local_addr().map_err(RelayError::Io)?,
            static_dir = %host.config.static_dir.display(),
            "Server running"
        );

        let app = RelayExposure::build_router(host);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(RelayError::Io)?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_host_with_defaults() {
        let host = RelayServerBuilder::new().build_host().unwrap();
        assert_eq!(host.config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_build_host_rejects_invalid_config() {
        let config = RelayConfig {
            peer_buffer: 0,
            ..Default::default()
        };
        let result = RelayServerBuilder::new().with_config(config).build_host();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_router() {
        let router = RelayServerBuilder::new()
            .with_config(RelayConfig {
                port: 0,
                ..Default::default()
            })
            .build();
        assert!(router.is_ok());
    }

    #[tokio::test]
    async fn test_serve_reports_bind_failure_as_io_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = RelayServerBuilder::new()
            .with_config(RelayConfig {
                host: "127.0.0.1".to_string(),
                port,
                ..Default::default()
            })
            .serve()
            .await
            .unwrap_err();

        let relay_err = err.downcast_ref::<RelayError>().unwrap();
        assert!(matches!(relay_err, RelayError::Io(_)));
        assert_eq!(relay_err.error_code(), "IO_ERROR");
    }
}
