//! sr-server: HTTP API for ranking a TV series' seasons by episode rating.
//!
//! This crate wires the domain types from `sr-core` to the network:
//!
//! - OMDb client behind the [`provider::SeriesProvider`] trait
//! - Bounded TTL response cache and per-client fixed-window rate limiter
//! - Axum router with request ids, CORS, and tracing
//! - Graceful shutdown via signal handling

pub mod cache;
pub mod context;
pub mod error;
pub mod lookup;
pub mod middleware;
pub mod omdb;
pub mod provider;
pub mod rate_limit;
pub mod router;
pub mod routes;

use std::net::SocketAddr;

use sr_core::config::Config;

use crate::context::AppContext;

/// Start the server and block until a shutdown signal arrives.
pub async fn start(config: Config) -> sr_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| sr_core::Error::Unexpected(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::from_config(config)?;
    tracing::info!(provider = ctx.provider.name(), "Series provider ready");

    let app = router::build_router(ctx);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
