//! HTTP transport for MCP server.
//!
//! A single endpoint, `/mcp`, accepts one JSON-RPC message per `POST`:
//!
//! - `initialize` without an `Mcp-Session-Id` header opens a new session; the
//!   id is returned in the `Mcp-Session-Id` response header
//! - every other message must carry a known session id (missing: `400`,
//!   unknown: `404`)
//! - requests are answered with `200` and the JSON-RPC response body,
//!   notifications with `202` and no body
//!
//! `DELETE /mcp` closes the session named in the header. Responses are plain
//! JSON; server-sent event streams are not offered.
//!
//! Sessions idle for longer than [`SessionLimits::idle_timeout`] are dropped,
//! and once [`SessionLimits::max_sessions`] are open a further `initialize`
//! is refused with `503`.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::mcp::protocol::{parse_value, JsonRpcError};
use crate::mcp::server::{McpServer, ServerState, Session};
use crate::mcp::transport::{shutdown_signal, Transport};

/// Header carrying the session identifier.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Default cap on concurrently open sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Default idle time after which a session is dropped.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Bounds on the session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions that may be open at once.
    pub max_sessions: usize,
    /// Time since its last request after which a session expires.
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_timeout: DEFAULT_SESSION_IDLE,
        }
    }
}

struct SessionEntry {
    session: Session,
    last_seen: Instant,
}

impl SessionEntry {
    fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.last_seen.elapsed() >= idle_timeout
    }
}

/// Shared state of the HTTP handlers.
#[derive(Clone)]
struct HttpState {
    server: Arc<McpServer>,
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    limits: SessionLimits,
}

/// An HTTP-based MCP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    host: String,
    port: u16,
    limits: SessionLimits,
}

impl HttpTransport {
    /// Creates a transport that will bind to `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            limits: SessionLimits::default(),
        }
    }

    /// Replaces the session limits.
    #[must_use]
    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the router serving `/mcp`.
    pub fn router(&self, server: Arc<McpServer>) -> Router {
        let state = HttpState {
            server,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            limits: self.limits,
        };

        Router::new()
            .route("/mcp", post(handle_post).delete(handle_delete))
            .with_state(state)
    }

    /// Serves on an already-bound listener until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting connections fails.
    pub async fn serve_listener<F>(
        &self,
        listener: TcpListener,
        server: Arc<McpServer>,
        shutdown: F,
    ) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router(server))
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn serve(self: Box<Self>, server: Arc<McpServer>) -> io::Result<()> {
        let addr = self.address();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!(addr = %addr, error = %e, "Failed to bind HTTP transport");
            e
        })?;

        tracing::info!(addr = %listener.local_addr()?, "HTTP transport listening on /mcp");

        self.serve_listener(listener, server, async {
            if let Err(e) = shutdown_signal().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signals");
                std::future::pending::<()>().await;
            }
        })
        .await?;

        tracing::info!("HTTP transport shut down");
        Ok(())
    }
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn with_session_header(mut response: Response, id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

async fn handle_post(State(state): State<HttpState>, headers: HeaderMap, body: Bytes) -> Response {
    let message = match serde_json::from_slice(&body) {
        Ok(value) => parse_value(value),
        Err(_) => Err(JsonRpcError::parse_error()),
    };
    let message = match message {
        Ok(message) => message,
        Err(error) => return (StatusCode::BAD_REQUEST, Json(error)).into_response(),
    };

    let opens_session = message.method() == "initialize" && message.id().is_some();

    let (id, mut session, is_new) = match session_id(&headers) {
        None if opens_session => {
            let mut sessions = state.sessions.lock().await;
            sweep_expired(&mut sessions, state.limits.idle_timeout);
            if sessions.len() >= state.limits.max_sessions {
                tracing::warn!(open = sessions.len(), "Session limit reached");
                return (StatusCode::SERVICE_UNAVAILABLE, "Too many sessions").into_response();
            }
            (Uuid::new_v4().to_string(), Session::new(), true)
        }
        None => {
            return (StatusCode::BAD_REQUEST, "Missing Mcp-Session-Id header").into_response();
        }
        Some(id) => {
            let mut sessions = state.sessions.lock().await;
            let Some(entry) = sessions.get_mut(&id) else {
                return (StatusCode::NOT_FOUND, "Unknown session").into_response();
            };
            if entry.is_expired(state.limits.idle_timeout) {
                sessions.remove(&id);
                tracing::info!(session = %id, "HTTP session expired");
                return (StatusCode::NOT_FOUND, "Unknown session").into_response();
            }
            entry.last_seen = Instant::now();
            let session = entry.session.clone();
            (id, session, false)
        }
    };

    let reply = state.server.handle_message(&mut session, message).await;

    let keep = {
        let mut sessions = state.sessions.lock().await;
        if is_new {
            // A failed initialize leaves nothing behind
            let opened = session.state() != ServerState::AwaitingInit;
            if opened && sessions.len() >= state.limits.max_sessions {
                tracing::warn!(open = sessions.len(), "Session limit reached");
                return (StatusCode::SERVICE_UNAVAILABLE, "Too many sessions").into_response();
            }
            if opened {
                tracing::info!(session = %id, "HTTP session opened");
                sessions.insert(
                    id.clone(),
                    SessionEntry {
                        session,
                        last_seen: Instant::now(),
                    },
                );
            }
            opened
        } else if let Some(entry) = sessions.get_mut(&id) {
            entry.session = session;
            entry.last_seen = Instant::now();
            true
        } else {
            // Closed while this request was in flight
            tracing::debug!(session = %id, "Session closed during request");
            false
        }
    };

    let response = match reply {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };

    if keep {
        with_session_header(response, &id)
    } else {
        response
    }
}

fn sweep_expired(sessions: &mut HashMap<String, SessionEntry>, idle_timeout: Duration) {
    sessions.retain(|id, entry| {
        let expired = entry.is_expired(idle_timeout);
        if expired {
            tracing::info!(session = %id, "HTTP session expired");
        }
        !expired
    });
}

async fn handle_delete(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return (StatusCode::BAD_REQUEST, "Missing Mcp-Session-Id header").into_response();
    };

    if state.sessions.lock().await.remove(&id).is_some() {
        tracing::info!(session = %id, "HTTP session closed");
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, "Unknown session").into_response()
    }
}
