//! Server lifecycle management
//!
//! Binds the HTTP listener and runs until a shutdown signal arrives.

use anyhow::Context;
use tracing::{error, info};

use chatcast_core::Config;

/// Serve the router on the configured address until Ctrl+C or SIGTERM.
pub async fn serve(router: axum::Router, config: &Config) -> anyhow::Result<()> {
    let address = config.http_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind HTTP address {address}"))?;

    info!("HTTP server listening on {}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C, starting graceful shutdown..."); }
        () = terminate => { info!("Received SIGTERM, starting graceful shutdown..."); }
    }
}
