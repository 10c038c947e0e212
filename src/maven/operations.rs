//! Tool operations over the registry search.
//!
//! Each operation validates its arguments, parses the coordinate, issues
//! exactly one search and shapes a plain-text answer. Malformed input is an
//! [`InvalidParams`] error; empty results and upstream failures are
//! [`ToolOutcome`] variants so the caller can read and react to them.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::maven::coordinate::Coordinate;
use crate::maven::query::SearchQuery;
use crate::maven::search::SearchClient;
use crate::maven::version::{
    ranked_listing, select_latest, Selection, SelectionPolicy, VersionRecord, DEFAULT_DEPTH,
    MAX_DEPTH,
};

/// Malformed or insufficient tool arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidParams {
    /// Description of the problem, shown to the client.
    pub message: String,
}

impl InvalidParams {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Text outcome of a tool operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Successful answer.
    Ok(String),
    /// Nothing matched (no candidates, or no stable candidates).
    NotFound(String),
    /// The search call failed.
    UpstreamError(String),
}

impl ToolOutcome {
    /// Returns the text payload.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Ok(text) | Self::NotFound(text) | Self::UpstreamError(text) => text,
        }
    }

    /// Returns `true` for the error-flagged variants.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Ok(_))
    }
}

/// Result type for tool operations.
pub type OperationResult = Result<ToolOutcome, InvalidParams>;

/// The Maven tool operations, bound to a search client.
#[derive(Clone)]
pub struct MavenTools {
    client: Arc<dyn SearchClient>,
}

impl MavenTools {
    /// Creates the operations on top of a search client.
    #[must_use]
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }

    /// `get_maven_latest_version`: the most recently published version.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParams`] if `dependency` is missing or malformed.
    pub async fn latest_version(&self, arguments: &Value) -> OperationResult {
        let coord = dependency_arg(arguments)?;
        let query = SearchQuery::for_coordinate(&coord);

        let records = match self.fetch(&query).await {
            Ok(records) => records,
            Err(outcome) => return Ok(outcome),
        };

        Ok(selection_outcome(
            &coord,
            select_latest(records, SelectionPolicy::Published, false),
            |record| record.version,
        ))
    }

    /// `get_latest_release`: the latest version, excluding pre-releases
    /// unless told otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParams`] if `dependency` is missing or malformed, or
    /// if an optional argument has the wrong type or value.
    pub async fn latest_release(&self, arguments: &Value) -> OperationResult {
        let coord = dependency_arg(arguments)?;
        let exclude = bool_arg(arguments, "excludePreReleases", true)?;
        let policy = policy_arg(arguments)?;
        let query = SearchQuery::for_coordinate(&coord);

        let records = match self.fetch(&query).await {
            Ok(records) => records,
            Err(outcome) => return Ok(outcome),
        };

        Ok(selection_outcome(
            &coord,
            select_latest(records, policy, exclude),
            |record| record.version,
        ))
    }

    /// `check_maven_version_exists`: `"true"` or `"false"`.
    ///
    /// A version embedded in the coordinate takes precedence over the
    /// separate `version` argument.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParams`] if `dependency` is missing or malformed, or
    /// if no version is supplied by either source.
    pub async fn version_exists(&self, arguments: &Value) -> OperationResult {
        let coord = dependency_arg(arguments)?;
        let separate = optional_string_arg(arguments, "version")?;

        let version = coord
            .version
            .clone()
            .or_else(|| separate.filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                InvalidParams::new(
                    "A version is required: include it in the dependency \
                     (groupId:artifactId:version) or pass the 'version' parameter",
                )
            })?;

        let query = SearchQuery::for_version(&coord, &version);
        let records = match self.fetch(&query).await {
            Ok(records) => records,
            Err(outcome) => return Ok(outcome),
        };

        let exists = records.iter().any(|r| r.version == version);
        Ok(ToolOutcome::Ok(exists.to_string()))
    }

    /// `list_maven_versions`: newest first, one `"<version> (<date>)"` per line.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParams`] if `dependency` is missing or malformed, or
    /// if `depth` is not an integer in `1..=100`.
    pub async fn list_versions(&self, arguments: &Value) -> OperationResult {
        let coord = dependency_arg(arguments)?;
        let depth = depth_arg(arguments)?;
        let exclude = bool_arg(arguments, "excludePreReleases", true)?;
        let query = SearchQuery::for_coordinate(&coord);

        let records = match self.fetch(&query).await {
            Ok(records) => records,
            Err(outcome) => return Ok(outcome),
        };

        Ok(selection_outcome(
            &coord,
            ranked_listing(records, depth, exclude),
            |lines| lines.join("\n"),
        ))
    }

    /// Runs the single search of an operation, mapping failures to an
    /// error-flagged outcome.
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<VersionRecord>, ToolOutcome> {
        self.client.search(query).await.map_err(|e| {
            tracing::warn!(error = %e, q = %query.query, "Maven Central search failed");
            ToolOutcome::UpstreamError(format!("Maven Central search failed: {e}"))
        })
    }
}

fn selection_outcome<T>(
    coord: &Coordinate,
    selection: Selection<T>,
    render: impl FnOnce(T) -> String,
) -> ToolOutcome {
    match selection {
        Selection::Found(value) => ToolOutcome::Ok(render(value)),
        Selection::NoCandidates => {
            ToolOutcome::NotFound(format!("No versions found for {}", coord.key()))
        }
        Selection::NoStableReleases => {
            ToolOutcome::NotFound(format!("No stable releases found for {}", coord.key()))
        }
    }
}

fn dependency_arg(arguments: &Value) -> Result<Coordinate, InvalidParams> {
    let raw = arguments
        .get("dependency")
        .and_then(Value::as_str)
        .ok_or_else(|| InvalidParams::new("Missing required parameter: dependency"))?;

    Coordinate::parse(raw).map_err(|e| InvalidParams::new(e.to_string()))
}

fn optional_string_arg(arguments: &Value, name: &str) -> Result<Option<String>, InvalidParams> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(InvalidParams::new(format!(
            "Parameter '{name}' must be a string"
        ))),
    }
}

fn bool_arg(arguments: &Value, name: &str, default: bool) -> Result<bool, InvalidParams> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(InvalidParams::new(format!(
            "Parameter '{name}' must be a boolean"
        ))),
    }
}

fn policy_arg(arguments: &Value) -> Result<SelectionPolicy, InvalidParams> {
    match optional_string_arg(arguments, "versionOrder")? {
        None => Ok(SelectionPolicy::default()),
        Some(name) => SelectionPolicy::from_name(&name).ok_or_else(|| {
            InvalidParams::new(format!(
                "Parameter 'versionOrder' must be 'published' or 'semantic', got '{name}'"
            ))
        }),
    }
}

fn depth_arg(arguments: &Value) -> Result<usize, InvalidParams> {
    let out_of_range =
        || InvalidParams::new(format!("Parameter 'depth' must be an integer between 1 and {MAX_DEPTH}"));

    match arguments.get("depth") {
        None | Some(Value::Null) => Ok(DEFAULT_DEPTH),
        Some(value) => {
            let depth = value.as_u64().ok_or_else(out_of_range)?;
            usize::try_from(depth)
                .ok()
                .filter(|d| (1..=MAX_DEPTH).contains(d))
                .ok_or_else(out_of_range)
        }
    }
}
