use std::fmt;

use anyhow::Result;
use tokio::signal;

/// Signals that can trigger shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    CtrlC,
    #[cfg(unix)]
    Sigterm,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::CtrlC => f.write_str("SIGINT"),
            #[cfg(unix)]
            ShutdownSignal::Sigterm => f.write_str("SIGTERM"),
        }
    }
}

/// Wait for termination signals (Ctrl+C, SIGTERM).
///
/// # Errors
/// Returns an error if signal handling fails.
pub async fn wait_for_shutdown() -> Result<ShutdownSignal> {
    let received = tokio::select! {
        result = wait_ctrl_c() => result?,
        result = wait_sigterm() => result?,
    };

    tracing::info!(signal = %received, "Shutdown signal received, draining connections");
    Ok(received)
}

/// Future for `axum::serve(..).with_graceful_shutdown`.
///
/// If the handlers cannot be installed the error is logged and the future
/// never resolves, leaving the server running.
pub async fn shutdown_signal() {
    if let Err(e) = wait_for_shutdown().await {
        tracing::error!(error = %e, "Signal handling unavailable, graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
}

async fn wait_ctrl_c() -> Result<ShutdownSignal> {
    signal::ctrl_c().await.map_err(|e| {
        tracing::error!(%e, "Error handling Ctrl+C signal");
        e
    })?;
    Ok(ShutdownSignal::CtrlC)
}

#[cfg(unix)]
async fn wait_sigterm() -> Result<ShutdownSignal> {
    let mut signal_handler =
        signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|e| {
            tracing::error!(%e, "Failed to install SIGTERM handler");
            e
        })?;
    signal_handler.recv().await;
    Ok(ShutdownSignal::Sigterm)
}

#[cfg(not(unix))]
async fn wait_sigterm() -> Result<ShutdownSignal> {
    std::future::pending::<Result<ShutdownSignal>>().await
}
