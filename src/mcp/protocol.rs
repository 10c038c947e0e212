//! JSON-RPC 2.0 framing for MCP.
//!
//! Incoming messages are classified by shape: an object carrying an `id` is a
//! [`JsonRpcRequest`], one without is a [`JsonRpcNotification`]. Everything
//! the server sends back is an [`OutgoingMessage`].

use serde::Serialize;
use serde_json::{Map, Value};

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "maven-central-mcp";

/// Value of the `jsonrpc` member on every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request ID. `null` is not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl RequestId {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) => Some(Self::String(s)),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A request from the client.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    /// Request identifier, echoed in the reply.
    pub id: RequestId,
    /// The method to invoke.
    pub method: String,
    /// Method parameters, if any.
    pub params: Option<Value>,
}

/// A notification from the client. Never answered.
#[derive(Debug, Clone)]
pub struct JsonRpcNotification {
    /// The notification method.
    pub method: String,
    /// Notification parameters, if any.
    pub params: Option<Value>,
}

/// A message received from the client.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// A request expecting a response.
    Request(JsonRpcRequest),
    /// A notification (no response expected).
    Notification(JsonRpcNotification),
}

impl IncomingMessage {
    /// Returns the method name of this message.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Request(req) => &req.method,
            Self::Notification(notif) => &notif.method,
        }
    }

    /// Returns the request ID if this is a request.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(req) => Some(&req.id),
            Self::Notification(_) => None,
        }
    }
}

/// A successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    /// The request ID this response corresponds to.
    pub id: RequestId,
    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// Error codes reserved by JSON-RPC 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON is not a valid message.
    InvalidRequest,
    /// The method does not exist.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorObject {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

/// An error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    jsonrpc: &'static str,
    /// The request ID; `null` when it could not be determined.
    pub id: Option<RequestId>,
    /// The error details.
    pub error: ErrorObject,
}

impl JsonRpcError {
    /// Creates an error reply with a custom message.
    #[must_use]
    pub fn with_code(id: Option<RequestId>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: ErrorObject {
                code: code.code(),
                message: message.into(),
            },
        }
    }

    /// Input was not valid JSON. The ID is unknown.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::with_code(None, ErrorCode::ParseError, ErrorCode::ParseError.label())
    }

    /// Input was JSON but not a valid JSON-RPC message.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::with_code(id, ErrorCode::InvalidRequest, ErrorCode::InvalidRequest.label())
    }

    /// The method is not implemented.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::with_code(
            Some(id),
            ErrorCode::MethodNotFound,
            format!("{}: {method}", ErrorCode::MethodNotFound.label()),
        )
    }

    /// The parameters were rejected.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::with_code(Some(id), ErrorCode::InvalidParams, message)
    }

    /// Something failed on the server side.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::with_code(Some(id), ErrorCode::InternalError, message)
    }
}

/// A message sent from the server to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    /// A success response.
    Response(JsonRpcResponse),
    /// An error response.
    Error(JsonRpcError),
}

impl OutgoingMessage {
    /// Returns `true` if this is an error response.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<JsonRpcResponse> for OutgoingMessage {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for OutgoingMessage {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}

/// Parses one line of input into an incoming message.
///
/// # Errors
///
/// Returns a parse error for malformed JSON, or an invalid-request error for
/// JSON that is not a JSON-RPC 2.0 message.
pub fn parse_message(json: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(json).map_err(|_| JsonRpcError::parse_error())?;
    parse_value(value)
}

/// Classifies an already-decoded JSON value as a request or notification.
///
/// # Errors
///
/// Returns an invalid-request error if the value is not a JSON-RPC 2.0
/// message. The error carries the request ID when one could be read.
pub fn parse_value(value: Value) -> Result<IncomingMessage, JsonRpcError> {
    let Value::Object(mut obj) = value else {
        return Err(JsonRpcError::invalid_request(None));
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(JsonRpcError::invalid_request(None));
    }

    let id = match obj.remove("id") {
        None => None,
        Some(raw) => Some(
            RequestId::from_value(raw).ok_or_else(|| JsonRpcError::invalid_request(None))?,
        ),
    };

    let method = match obj.remove("method") {
        Some(Value::String(method)) if !method.is_empty() => method,
        _ => return Err(JsonRpcError::invalid_request(id)),
    };

    let params = take_params(&mut obj);

    Ok(match id {
        Some(id) => IncomingMessage::Request(JsonRpcRequest { id, method, params }),
        None => IncomingMessage::Notification(JsonRpcNotification { method, params }),
    })
}

fn take_params(obj: &mut Map<String, Value>) -> Option<Value> {
    obj.remove("params").filter(|p| !p.is_null())
}
