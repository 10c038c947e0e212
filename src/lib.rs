//! maven-central-mcp: MCP server for resolving Maven Central dependency versions
//!
//! This library answers version questions about Maven artifacts for AI
//! assistants: the latest version, the latest stable release, whether a
//! version exists, and a dated list of recent versions.
//!
//! # Architecture
//!
//! The decision-making lives in [`maven`] and is independent of MCP:
//!
//! - **Coordinates**: `groupId:artifactId[:version][:packaging][:classifier]`
//! - **Selection**: newest-by-publish-date or highest-version-number, with
//!   optional pre-release filtering
//! - **Search**: one query per request against the Maven Central search API
//!
//! The [`mcp`] module wraps those operations as tools over stdio or HTTP.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`maven`]: Coordinates, version selection and registry search
//! - [`mcp`]: MCP protocol implementation

pub mod config;
pub mod error;
pub mod maven;
pub mod mcp;
