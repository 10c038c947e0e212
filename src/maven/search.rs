//! Registry search capability.
//!
//! [`SearchClient`] is the only outbound dependency of the tool operations.
//! [`MavenCentralClient`] implements it against the Maven Central
//! `solrsearch` endpoint; tests substitute in-memory implementations.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::maven::error::{SearchError, SearchResult};
use crate::maven::query::SearchQuery;
use crate::maven::version::VersionRecord;

/// Default search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://search.maven.org/solrsearch/select";

/// Executes a single search query.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Runs the query and returns the records in the order the registry
    /// returned them.
    async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<VersionRecord>>;
}

/// Search client for the Maven Central search API.
#[derive(Debug, Clone)]
pub struct MavenCentralClient {
    http: reqwest::Client,
    base_url: String,
    rows: usize,
}

impl MavenCentralClient {
    /// Creates a client from the search configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|source| SearchError::Transport { source })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            rows: config.rows,
        })
    }

    /// Returns the configured endpoint URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SearchClient for MavenCentralClient {
    async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<VersionRecord>> {
        let rows = query.rows.min(self.rows).to_string();
        let mut params = vec![
            ("q", query.query.as_str()),
            ("core", "gav"),
            ("rows", rows.as_str()),
            ("wt", "json"),
        ];
        if query.sort_by_timestamp {
            params.push(("sort", "timestamp desc"));
        }

        tracing::debug!(q = %query.query, rows = %rows, "Querying Maven Central");

        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|source| SearchError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Search request returned an error status");
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body: SolrResponse = response.json().await?;
        let records: Vec<VersionRecord> = body
            .response
            .docs
            .into_iter()
            .map(VersionRecord::from)
            .collect();

        tracing::debug!(
            num_found = body.response.num_found,
            returned = records.len(),
            "Search completed"
        );

        Ok(records)
    }
}

/// Top-level search response body.
#[derive(Debug, Deserialize)]
struct SolrResponse {
    response: SolrResults,
}

#[derive(Debug, Deserialize)]
struct SolrResults {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<SolrDoc>,
}

/// One record of the `gav` core.
#[derive(Debug, Deserialize)]
struct SolrDoc {
    g: String,
    a: String,
    v: String,
    #[serde(default)]
    p: Option<String>,
    timestamp: i64,
}

impl From<SolrDoc> for VersionRecord {
    fn from(doc: SolrDoc) -> Self {
        Self {
            group_id: doc.g,
            artifact_id: doc.a,
            version: doc.v,
            published_at: doc.timestamp,
            packaging: doc.p,
        }
    }
}
