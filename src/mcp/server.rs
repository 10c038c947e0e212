//! MCP server implementation for Maven Central version queries.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: Connection termination
//!
//! The server itself is transport-agnostic. Lifecycle state lives in a
//! [`Session`] owned by the transport (one per stdio process, one per HTTP
//! session id), and [`McpServer`] only dispatches messages.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::maven::{MavenTools, SearchClient, ToolOutcome, DEFAULT_DEPTH, MAX_DEPTH};
use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, OutgoingMessage, RequestId,
    MCP_PROTOCOL_VERSION, SERVER_NAME,
};

/// Tool name: most recently published version.
pub const TOOL_LATEST_VERSION: &str = "get_maven_latest_version";
/// Tool name: latest release, optionally excluding pre-releases.
pub const TOOL_LATEST_RELEASE: &str = "get_latest_release";
/// Tool name: existence check for one version.
pub const TOOL_VERSION_EXISTS: &str = "check_maven_version_exists";
/// Tool name: ranked version listing.
pub const TOOL_LIST_VERSIONS: &str = "list_maven_versions";

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Per-connection protocol state.
#[derive(Debug, Clone)]
pub struct Session {
    state: ServerState,
    protocol_version: Option<String>,
}

impl Session {
    /// Creates a session awaiting initialisation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ServerState::AwaitingInit,
            protocol_version: None,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, if initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Marks the session as shutting down.
    pub fn shut_down(&mut self) {
        self.state = ServerState::ShuttingDown;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

impl From<ToolOutcome> for ToolCallResult {
    fn from(outcome: ToolOutcome) -> Self {
        match outcome {
            ToolOutcome::Ok(text) => Self::text(text),
            ToolOutcome::NotFound(text) | ToolOutcome::UpstreamError(text) => Self::error(text),
        }
    }
}

/// The MCP server for Maven Central version queries.
#[derive(Clone)]
pub struct McpServer {
    tools: MavenTools,
}

impl McpServer {
    /// Creates a new MCP server backed by the given search client.
    #[must_use]
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self {
            tools: MavenTools::new(client),
        }
    }

    /// Handles a single raw line of input.
    ///
    /// Returns the message to send back, or `None` for notifications.
    pub async fn handle_line(&self, session: &mut Session, line: &str) -> Option<OutgoingMessage> {
        match parse_message(line) {
            Ok(msg) => self.handle_message(session, msg).await,
            Err(error) => Some(error.into()),
        }
    }

    /// Handles a parsed incoming message.
    ///
    /// Returns the message to send back, or `None` for notifications.
    pub async fn handle_message(
        &self,
        session: &mut Session,
        msg: IncomingMessage,
    ) -> Option<OutgoingMessage> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(session, req).await),
            IncomingMessage::Notification(ref notif) => {
                Self::handle_notification(session, notif);
                None
            }
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&self, session: &mut Session, req: JsonRpcRequest) -> OutgoingMessage {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => Self::handle_initialize(session, &req),
            "tools/list" => Self::handle_tools_list(session, &req),
            "tools/call" => self.handle_tools_call(session, &req).await,
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => resp.into(),
            Err(error) => error.into(),
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(session: &mut Session, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && session.state == ServerState::Initialising
        {
            session.state = ServerState::Running;
            tracing::info!("Client initialised, server running");
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(
        session: &mut Session,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        if session.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::with_code(
                Some(req.id.clone()),
                ErrorCode::InvalidRequest,
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid initialize params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing initialize params")
            })?;

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = %params.protocol_version,
                "Initialising session"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        session.protocol_version = Some(negotiated_version.clone());
        session.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(
        session: &Session,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        Self::require_running(session, &req.id)?;

        let result = json!({
            "tools": Self::tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &self,
        session: &Session,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        Self::require_running(session, &req.id)?;

        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        tracing::info!(tool = %params.name, "Tool call");

        let outcome = match params.name.as_str() {
            TOOL_LATEST_VERSION => self.tools.latest_version(&params.arguments).await,
            TOOL_LATEST_RELEASE => self.tools.latest_release(&params.arguments).await,
            TOOL_VERSION_EXISTS => self.tools.version_exists(&params.arguments).await,
            TOOL_LIST_VERSIONS => self.tools.list_versions(&params.arguments).await,
            _ => {
                tracing::warn!(tool = %params.name, "Unknown tool");
                let result = ToolCallResult::error(format!("Unknown tool: {}", params.name));
                return Self::tool_response(&req.id, &result);
            }
        };

        let result = match outcome {
            Ok(outcome) => {
                tracing::debug!(
                    tool = %params.name,
                    is_error = outcome.is_error(),
                    "Tool call completed"
                );
                ToolCallResult::from(outcome)
            }
            Err(e) => {
                tracing::debug!(tool = %params.name, error = %e, "Invalid tool arguments");
                return Err(JsonRpcError::invalid_params(req.id.clone(), e.message));
            }
        };

        Self::tool_response(&req.id, &result)
    }

    /// Wraps a tool result in a success response.
    fn tool_response(
        id: &RequestId,
        result: &ToolCallResult,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        let result_value = serde_json::to_value(result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(id.clone(), "Internal error: failed to serialise result")
        })?;

        Ok(JsonRpcResponse::success(id.clone(), result_value))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Ensures the session is in the Running state.
    fn require_running(session: &Session, id: &RequestId) -> Result<(), JsonRpcError> {
        if session.state != ServerState::Running {
            return Err(JsonRpcError::with_code(
                Some(id.clone()),
                ErrorCode::InvalidRequest,
                "Server not initialised",
            ));
        }
        Ok(())
    }

    /// Returns the list of available tools.
    #[must_use]
    pub fn tool_definitions() -> Vec<ToolDefinition> {
        let dependency = json!({
            "type": "string",
            "description": "Maven coordinate: groupId:artifactId[:version][:packaging][:classifier]"
        });
        let exclude_pre_releases = json!({
            "type": "boolean",
            "description": "Skip alpha, beta, milestone, RC and snapshot versions (default: true)",
            "default": true
        });

        vec![
            ToolDefinition {
                name: TOOL_LATEST_VERSION.to_string(),
                description: Some(
                    "Get the most recently published version of a Maven dependency, \
                     including pre-releases. Returns only the version string."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "dependency": dependency,
                    },
                    "required": ["dependency"]
                }),
            },
            ToolDefinition {
                name: TOOL_LATEST_RELEASE.to_string(),
                description: Some(
                    "Get the latest release of a Maven dependency. Pre-release versions \
                     are excluded unless excludePreReleases is false. Returns only the \
                     version string."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "dependency": dependency,
                        "excludePreReleases": exclude_pre_releases,
                        "versionOrder": {
                            "type": "string",
                            "enum": ["published", "semantic"],
                            "description": "Pick the most recently published version, or the \
                                            highest version number (default: published)",
                            "default": "published"
                        }
                    },
                    "required": ["dependency"]
                }),
            },
            ToolDefinition {
                name: TOOL_VERSION_EXISTS.to_string(),
                description: Some(
                    "Check whether a specific version of a Maven dependency exists. \
                     The version may be part of the dependency coordinate or given \
                     separately; the coordinate wins when both are present. \
                     Returns \"true\" or \"false\"."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "dependency": dependency,
                        "version": {
                            "type": "string",
                            "description": "Version to check, if not included in the dependency"
                        }
                    },
                    "required": ["dependency"]
                }),
            },
            ToolDefinition {
                name: TOOL_LIST_VERSIONS.to_string(),
                description: Some(
                    "List versions of a Maven dependency, most recently published first, \
                     one \"version (yyyy-mm-dd)\" entry per line."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "dependency": dependency,
                        "depth": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": MAX_DEPTH,
                            "default": DEFAULT_DEPTH,
                            "description": "Number of versions to return"
                        },
                        "excludePreReleases": exclude_pre_releases,
                    },
                    "required": ["dependency"]
                }),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::maven::{SearchQuery, SearchResult, VersionRecord};

    struct NoResults;

    #[async_trait]
    impl SearchClient for NoResults {
        async fn search(&self, _query: &SearchQuery) -> SearchResult<Vec<VersionRecord>> {
            Ok(Vec::new())
        }
    }

    fn server() -> McpServer {
        McpServer::new(Arc::new(NoResults))
    }

    async fn running_session(server: &McpServer) -> Session {
        let mut session = Session::new();
        let init = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{}}}"#;
        assert!(server.handle_line(&mut session, init).await.is_some());
        let ready = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server.handle_line(&mut session, ready).await.is_none());
        session
    }

    fn result_of(msg: OutgoingMessage) -> Value {
        match msg {
            OutgoingMessage::Response(resp) => resp.result,
            OutgoingMessage::Error(err) => panic!("unexpected error: {}", err.error.message),
        }
    }

    #[test]
    fn session_initial_state() {
        let session = Session::new();
        assert_eq!(session.state(), ServerState::AwaitingInit);
        assert!(session.protocol_version().is_none());
    }

    #[test]
    fn tool_definitions_valid() {
        let tools = McpServer::tool_definitions();
        assert_eq!(tools.len(), 4);

        for tool in &tools {
            assert!(!tool.name.is_empty());
            assert!(tool.input_schema.is_object());
            assert_eq!(tool.input_schema["required"], json!(["dependency"]));
        }
    }

    #[test]
    fn tool_call_result_text() {
        let result = ToolCallResult::text("6.2.8");
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);

        match &result.content[0] {
            ToolContent::Text { text } => assert_eq!(text, "6.2.8"),
        }
    }

    #[test]
    fn tool_call_result_from_outcome() {
        let result = ToolCallResult::from(ToolOutcome::NotFound("No versions found".to_string()));
        assert!(result.is_error);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isError"], json!(true));
        assert_eq!(json["content"][0]["type"], json!("text"));

        let ok = serde_json::to_value(ToolCallResult::from(ToolOutcome::Ok("true".to_string())))
            .unwrap();
        assert!(ok.get("isError").is_none());
    }

    #[tokio::test]
    async fn initialize_moves_to_running() {
        let server = server();
        let session = running_session(&server).await;
        assert_eq!(session.state(), ServerState::Running);
        assert_eq!(session.protocol_version(), Some(MCP_PROTOCOL_VERSION));
    }

    #[tokio::test]
    async fn second_initialize_is_rejected() {
        let server = server();
        let mut session = running_session(&server).await;
        let init = r#"{"jsonrpc":"2.0","id":9,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#;
        let reply = server.handle_line(&mut session, init).await.unwrap();
        assert!(reply.is_error());
    }

    #[tokio::test]
    async fn tools_require_initialisation() {
        let server = server();
        let mut session = Session::new();
        let list = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#;
        let reply = server.handle_line(&mut session, list).await.unwrap();
        assert!(reply.is_error());
    }

    #[tokio::test]
    async fn ping_works_before_initialisation() {
        let server = server();
        let mut session = Session::new();
        let ping = r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#;
        let reply = server.handle_line(&mut session, ping).await.unwrap();
        assert_eq!(result_of(reply), json!({}));
    }

    #[tokio::test]
    async fn unknown_method() {
        let server = server();
        let mut session = Session::new();
        let msg = r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#;
        let OutgoingMessage::Error(err) = server.handle_line(&mut session, msg).await.unwrap()
        else {
            panic!("expected error");
        };
        assert_eq!(err.error.code, ErrorCode::MethodNotFound.code());
    }

    #[tokio::test]
    async fn unknown_tool_is_error_text() {
        let server = server();
        let mut session = running_session(&server).await;
        let call = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#;
        let result = result_of(server.handle_line(&mut session, call).await.unwrap());
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["content"][0]["text"], json!("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn unknown_tool_ignores_its_arguments() {
        let server = server();
        let mut session = running_session(&server).await;
        let call = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope","arguments":{"dependency":"junit"}}}"#;
        let result = result_of(server.handle_line(&mut session, call).await.unwrap());
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["content"][0]["text"], json!("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn invalid_arguments_are_protocol_errors() {
        let server = server();
        let mut session = running_session(&server).await;
        let call = r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"get_maven_latest_version","arguments":{"dependency":"junit"}}}"#;
        let OutgoingMessage::Error(err) = server.handle_line(&mut session, call).await.unwrap()
        else {
            panic!("expected error");
        };
        assert_eq!(err.error.code, ErrorCode::InvalidParams.code());
        assert_eq!(err.id, Some(RequestId::Number(5)));
    }

    #[tokio::test]
    async fn empty_result_is_error_text() {
        let server = server();
        let mut session = running_session(&server).await;
        let call = r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"list_maven_versions","arguments":{"dependency":"com.example:missing"}}}"#;
        let result = result_of(server.handle_line(&mut session, call).await.unwrap());
        assert_eq!(result["isError"], json!(true));
        assert_eq!(
            result["content"][0]["text"],
            json!("No versions found for com.example:missing")
        );
    }

    #[tokio::test]
    async fn malformed_line_is_parse_error() {
        let server = server();
        let mut session = Session::new();
        let OutgoingMessage::Error(err) = server.handle_line(&mut session, "{oops").await.unwrap()
        else {
            panic!("expected error");
        };
        assert_eq!(err.error.code, ErrorCode::ParseError.code());
    }
}
