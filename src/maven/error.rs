//! Error types for Maven coordinate handling and registry search.

use thiserror::Error;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors produced while parsing a dependency coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// The coordinate does not have a non-empty groupId and artifactId.
    #[error(
        "Invalid coordinate format '{input}': expected groupId:artifactId[:version][:packaging][:classifier]"
    )]
    InvalidCoordinateFormat {
        /// The raw input that failed to parse.
        input: String,
    },
}

/// Errors that can occur while querying the search endpoint.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The HTTP request could not be sent or the connection failed.
    #[error("request failed: {source}")]
    Transport {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status code.
    #[error("unexpected HTTP status {status}")]
    Status {
        /// The status code returned.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("malformed response body: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<reqwest::Error> for SearchError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_decode() {
            Self::Decode {
                message: source.to_string(),
            }
        } else if let Some(status) = source.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::Transport { source }
        }
    }
}
