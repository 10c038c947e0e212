//! Integration tests for MCP protocol handling.
//!
//! These tests verify the MCP server's JSON-RPC 2.0 protocol implementation,
//! including request/response handling, error responses, and lifecycle management.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use maven_central_mcp::maven::{SearchClient, SearchQuery, SearchResult, VersionRecord};
use maven_central_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use maven_central_mcp::mcp::{McpServer, OutgoingMessage, Session, StdioTransport};

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_string_id() {
    let json = r#"{"jsonrpc": "2.0", "id": "abc", "method": "tools/list"}"#;

    match parse_message(json).unwrap() {
        IncomingMessage::Request(req) => {
            assert_eq!(req.id, RequestId::String("abc".to_string()));
        }
        IncomingMessage::Notification(_) => panic!("Expected Request"),
    }
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_invalid_json() {
    let result = parse_message("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let result = parse_message(json);
    assert!(result.is_err());
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

/// Search client with a fixed release history for `junit:junit`.
struct JunitHistory;

#[async_trait]
impl SearchClient for JunitHistory {
    async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<VersionRecord>> {
        let all = [
            ("5.0.0-M1", 1_720_000_000_000_i64),
            ("4.13.2", 1_613_000_000_000),
            ("4.13.1", 1_602_000_000_000),
            ("4.13", 1_579_000_000_000),
        ];
        Ok(all
            .iter()
            .filter(|(v, _)| !query.query.contains("v:") || query.query.contains(&format!("v:\"{v}\"")))
            .map(|(v, ts)| VersionRecord {
                group_id: "junit".to_string(),
                artifact_id: "junit".to_string(),
                version: (*v).to_string(),
                published_at: *ts,
                packaging: Some("jar".to_string()),
            })
            .collect())
    }
}

fn server() -> McpServer {
    McpServer::new(Arc::new(JunitHistory))
}

async fn send(server: &McpServer, session: &mut Session, message: Value) -> Option<Value> {
    server
        .handle_line(session, &message.to_string())
        .await
        .map(|reply| serde_json::to_value(reply).unwrap())
}

async fn initialised(server: &McpServer) -> Session {
    let mut session = Session::new();
    let reply = send(
        server,
        &mut session,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }),
    )
    .await
    .unwrap();
    assert_eq!(reply["result"]["protocolVersion"], "2024-11-05");

    let none = send(
        server,
        &mut session,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    )
    .await;
    assert!(none.is_none());
    session
}

async fn call_tool(server: &McpServer, session: &mut Session, name: &str, arguments: Value) -> Value {
    send(
        server,
        session,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn tools_require_initialisation() {
    let server = server();
    let mut session = Session::new();

    let reply = send(
        &server,
        &mut session,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
    )
    .await
    .unwrap();

    assert_eq!(reply["error"]["code"], -32600);
}

#[tokio::test]
async fn second_initialize_is_rejected() {
    let server = server();
    let mut session = initialised(&server).await;

    let reply = send(
        &server,
        &mut session,
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }),
    )
    .await
    .unwrap();

    assert_eq!(reply["error"]["code"], -32600);
}

#[tokio::test]
async fn ping_and_unknown_method() {
    let server = server();
    let mut session = initialised(&server).await;

    let reply = send(&server, &mut session, json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}))
        .await
        .unwrap();
    assert_eq!(reply["result"], json!({}));

    let reply = send(
        &server,
        &mut session,
        json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}),
    )
    .await
    .unwrap();
    assert_eq!(reply["error"]["code"], -32601);
}

#[tokio::test]
async fn tools_list_describes_all_tools() {
    let server = server();
    let mut session = initialised(&server).await;

    let reply = send(
        &server,
        &mut session,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await
    .unwrap();

    let names: Vec<&str> = reply["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "get_maven_latest_version",
            "get_latest_release",
            "check_maven_version_exists",
            "list_maven_versions"
        ]
    );
}

#[tokio::test]
async fn full_tool_flow() {
    let server = server();
    let mut session = initialised(&server).await;

    let latest = call_tool(
        &server,
        &mut session,
        "get_maven_latest_version",
        json!({"dependency": "junit:junit"}),
    )
    .await;
    assert_eq!(latest["result"]["content"][0]["text"], "5.0.0-M1");

    let release = call_tool(
        &server,
        &mut session,
        "get_latest_release",
        json!({"dependency": "junit:junit"}),
    )
    .await;
    assert_eq!(release["result"]["content"][0]["text"], "4.13.2");

    let exists = call_tool(
        &server,
        &mut session,
        "check_maven_version_exists",
        json!({"dependency": "junit:junit:4.13.1"}),
    )
    .await;
    assert_eq!(exists["result"]["content"][0]["text"], "true");

    let missing = call_tool(
        &server,
        &mut session,
        "check_maven_version_exists",
        json!({"dependency": "junit:junit", "version": "3.8.1"}),
    )
    .await;
    assert_eq!(missing["result"]["content"][0]["text"], "false");

    let listing = call_tool(
        &server,
        &mut session,
        "list_maven_versions",
        json!({"dependency": "junit:junit", "depth": 2}),
    )
    .await;
    let text = listing["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.starts_with("4.13.2 ("));
}

#[tokio::test]
async fn bad_arguments_are_protocol_errors() {
    let server = server();
    let mut session = initialised(&server).await;

    let reply = call_tool(
        &server,
        &mut session,
        "get_maven_latest_version",
        json!({"dependency": "junit"}),
    )
    .await;

    assert_eq!(reply["error"]["code"], -32602);
    assert!(reply["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid coordinate format"));
}

#[tokio::test]
async fn unknown_tool_is_an_error_result() {
    let server = server();
    let mut session = initialised(&server).await;

    let reply = call_tool(&server, &mut session, "resolve_gradle_plugin", json!({})).await;

    assert_eq!(reply["result"]["isError"], true);
    assert_eq!(
        reply["result"]["content"][0]["text"],
        "Unknown tool: resolve_gradle_plugin"
    );
}

#[tokio::test]
async fn unparseable_line_yields_parse_error() {
    let server = server();
    let mut session = Session::new();

    let reply = server.handle_line(&mut session, "{").await.unwrap();

    assert!(reply.is_error());
    assert!(matches!(reply, OutgoingMessage::Error(_)));
}

// =============================================================================
// Stdio Transport Tests
// =============================================================================

#[tokio::test]
async fn stdio_session_round_trip() {
    let server = server();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_latest_release","arguments":{"dependency":"junit:junit"}}}"#,
        "\n",
    );
    let mut output = Vec::new();
    let mut session = Session::new();

    let mut transport = StdioTransport::from_streams(input.as_bytes(), &mut output);
    transport.run(&server, &mut session).await.unwrap();
    drop(transport);

    let replies: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["id"], 1);
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["result"]["content"][0]["text"], "4.13.2");
}
