//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the Maven Central version queries as MCP tools. The
//! server speaks JSON-RPC 2.0 over either stdio or HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌──────────────┐    ┌─────────────┐    ┌──────────────┐    │
//! │   │  Transport   │───▶│   Server    │───▶│ MavenTools   │    │
//! │   │ (stdio/http) │    │ (lifecycle) │    │ (operations) │    │
//! │   └──────────────┘    └─────────────┘    └──────────────┘    │
//! │          │                  │                  │             │
//! │          ▼                  ▼                  ▼             │
//! │   ┌──────────────────────────────┐    ┌──────────────────┐   │
//! │   │      JSON-RPC Messages       │    │   SearchClient   │   │
//! │   └──────────────────────────────┘    └──────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, OutgoingMessage, MCP_PROTOCOL_VERSION,
};
pub use server::{McpServer, Session};
pub use transport::{HttpTransport, SessionLimits, StdioTransport, Transport};
