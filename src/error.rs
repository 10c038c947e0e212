//! Error types for maven-central-mcp.
//!
//! Domain errors for coordinates and registry search live in
//! [`crate::maven::error`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("configuration file not found: {}", path.display())]
    NotFound {
        /// The requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("failed to read {}", path.display())]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or has unknown keys.
    #[error("failed to parse {}: {source}", path.display())]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A setting has an unacceptable value.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending setting, e.g. `search.rows`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a [`ConfigError::Invalid`] for `field`.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
