//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::maven::{DEFAULT_SEARCH_URL, MAX_DEPTH};
use crate::mcp::transport::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};

/// Accepted values of `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Search endpoint settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// HTTP transport settings. Stdio is used when neither is set.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;

        if !(1..=MAX_DEPTH).contains(&search.rows) {
            return Err(ConfigError::invalid(
                "search.rows",
                format!("must be between 1 and {MAX_DEPTH}, got {}", search.rows),
            ));
        }

        if !(search.base_url.starts_with("http://") || search.base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "search.base_url",
                format!("'{}' is not an http(s) URL", search.base_url),
            ));
        }

        if search.timeout_secs == Some(0) {
            return Err(ConfigError::invalid("search.timeout_secs", "must be greater than zero"));
        }

        if self.server.max_sessions == 0 {
            return Err(ConfigError::invalid("server.max_sessions", "must be greater than zero"));
        }

        if self.server.session_idle_secs == 0 {
            return Err(ConfigError::invalid(
                "server.session_idle_secs",
                "must be greater than zero",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!(
                    "'{}' is not one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

/// Search endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Search endpoint URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum records requested per query (1-100).
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds. The HTTP client default applies when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            rows: default_rows(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

const fn default_rows() -> usize {
    MAX_DEPTH
}

fn default_user_agent() -> String {
    concat!("maven-central-mcp/", env!("CARGO_PKG_VERSION")).to_string()
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP transport to.
    #[serde(default)]
    pub host: Option<String>,

    /// Port to bind the HTTP transport to.
    #[serde(default)]
    pub port: Option<u16>,

    /// Sessions that may be open at once.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds of inactivity after which a session is dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

const fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

const fn default_session_idle_secs() -> u64 {
    DEFAULT_SESSION_IDLE.as_secs()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
