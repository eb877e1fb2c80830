//! Graceful shutdown and signal handling.
//!
//! Handles SIGINT (Ctrl+C) and SIGTERM: the server stops accepting new
//! connections and waits up to the configured grace period for in-flight
//! connections to complete.

use std::future::Future;
use std::time::Duration;

use axum_server::Handle;

/// Resolve once the process receives Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal is
/// ignored; the server then runs until the other signal arrives.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Trigger a graceful shutdown of `handle` once `signal` resolves.
///
/// When the signal fires, the server will:
/// 1. Stop accepting new connections
/// 2. Wait up to `grace` for existing connections to complete
/// 3. Drop whatever is still open and return from `serve`
pub fn setup_shutdown_handler<F>(handle: Handle, signal: F, grace: Duration)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        signal.await;

        handle.graceful_shutdown(Some(grace));
        tracing::info!(
            grace_secs = grace.as_secs(),
            "Graceful shutdown initiated, waiting for connections to close"
        );
    });
}
