//! Search query construction.
//!
//! Queries use the search endpoint's field grammar:
//! `g:"<groupId>" AND a:"<artifactId>" [AND p:"<packaging>"] [AND v:"<version>"]`.

use std::fmt::Write as _;

use crate::maven::coordinate::Coordinate;
use crate::maven::version::MAX_DEPTH;

/// A single query against the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// The field query string (`q` parameter).
    pub query: String,
    /// Maximum number of records requested.
    pub rows: usize,
    /// Whether the endpoint should sort by timestamp, newest first.
    pub sort_by_timestamp: bool,
}

impl SearchQuery {
    /// Builds a query for every published version of the coordinate.
    ///
    /// The coordinate's own version segment is not part of this query.
    #[must_use]
    pub fn for_coordinate(coord: &Coordinate) -> Self {
        Self {
            query: build_query(coord, None),
            rows: MAX_DEPTH,
            sort_by_timestamp: true,
        }
    }

    /// Builds a query scoped to one exact version of the coordinate.
    #[must_use]
    pub fn for_version(coord: &Coordinate, version: &str) -> Self {
        Self {
            query: build_query(coord, Some(version)),
            rows: MAX_DEPTH,
            sort_by_timestamp: false,
        }
    }
}

/// Renders the field query for a coordinate.
#[must_use]
pub fn build_query(coord: &Coordinate, version: Option<&str>) -> String {
    let mut query = String::new();
    push_clause(&mut query, "g", &coord.group_id);
    push_clause(&mut query, "a", &coord.artifact_id);
    if let Some(packaging) = &coord.packaging {
        push_clause(&mut query, "p", packaging);
    }
    if let Some(version) = version {
        push_clause(&mut query, "v", version);
    }
    query
}

fn push_clause(query: &mut String, field: &str, value: &str) {
    if !query.is_empty() {
        query.push_str(" AND ");
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    // Writing to a String cannot fail
    let _ = write!(query, "{field}:\"{escaped}\"");
}
