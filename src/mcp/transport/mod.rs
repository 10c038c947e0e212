//! Transports carrying MCP messages.
//!
//! The process entry point picks one transport at startup:
//!
//! - [`StdioTransport`]: newline-delimited JSON-RPC over stdin/stdout
//! - [`HttpTransport`]: JSON-RPC over HTTP `POST /mcp`
//!
//! Both drive the same [`McpServer`]; nothing in the server depends on which
//! one is in use.

mod http;
mod stdio;

pub use http::{
    HttpTransport, SessionLimits, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE, SESSION_HEADER,
};
pub use stdio::StdioTransport;

use std::sync::Arc;

use async_trait::async_trait;

use crate::mcp::server::McpServer;

/// A strategy for serving an [`McpServer`] to clients.
#[async_trait]
pub trait Transport: Send {
    /// Serves requests until the client disconnects or the process is
    /// asked to stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    async fn serve(self: Box<Self>, server: Arc<McpServer>) -> std::io::Result<()>;
}

/// Completes when the process receives SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
    Ok(())
}

/// Completes when the process receives Ctrl+C.
#[cfg(windows)]
pub async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    Ok(())
}
