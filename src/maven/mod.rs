//! Maven Central dependency resolution.
//!
//! This module contains everything that makes decisions about versions:
//!
//! - **Coordinates**: parsing `groupId:artifactId[:version][:packaging][:classifier]`
//! - **Pre-release classification**: qualifier matching on version strings
//! - **Selection**: most-recently-published and highest-semantic-value policies,
//!   stable-only filtering and ranked listings
//! - **Queries**: the search endpoint's field-query grammar
//! - **Search**: the [`SearchClient`] seam and its Maven Central implementation
//! - **Operations**: the tool handlers built on top of the above
//!
//! Nothing here knows about MCP or its transports.
//!
//! # Example
//!
//! ```
//! use maven_central_mcp::maven::{is_pre_release, Coordinate};
//!
//! let coord = Coordinate::parse("org.springframework:spring-core:7.0.0-M6").unwrap();
//! assert_eq!(coord.artifact_id, "spring-core");
//! assert!(is_pre_release(coord.version.as_deref().unwrap()));
//! ```

pub mod coordinate;
pub mod error;
pub mod operations;
pub mod prerelease;
pub mod query;
pub mod search;
pub mod version;

pub use coordinate::Coordinate;
pub use error::{CoordinateError, SearchError, SearchResult};
pub use operations::{InvalidParams, MavenTools, OperationResult, ToolOutcome};
pub use prerelease::is_pre_release;
pub use query::SearchQuery;
pub use search::{MavenCentralClient, SearchClient, DEFAULT_SEARCH_URL};
pub use version::{
    compare_semantic, ranked_listing, select_latest, Selection, SelectionPolicy, VersionRecord,
    DEFAULT_DEPTH, MAX_DEPTH,
};
