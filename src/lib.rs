//! seo-sweep: SEO analysis orchestration and remediation planning
//!
//! This crate resolves scheme variants for a target site, runs an analyzer
//! against them with a bounded scheme fallback, persists per-site outcomes into
//! a timestamped run directory, and aggregates a run into a ranked task list
//! and executive summary.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use serde::Serialize;
use thiserror::Error;

/// Main error type for seo-sweep operations
#[derive(Debug, Error)]
pub enum SeoSweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("All fetch attempts failed for {root}")]
    AllFetchAttemptsFailed { root: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("A target host or URL is required")]
    EmptyInput,

    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Classified failure of a single fetch or analysis attempt
///
/// Only `Network` failures (the request never reached a server) are eligible
/// for scheme fallback. The serialized form is what lands in
/// `{site}.error.json`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportError {
    #[error("HTTP {status} for {url}: {message}")]
    Http {
        url: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Network error for {url}: {message}")]
    Network {
        url: String,
        code: Option<String>,
        message: String,
    },

    #[error("{message}")]
    Other { message: String },
}

/// Coarse classification of a [`TransportError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Http,
    Network,
    Other,
}

impl TransportError {
    /// Returns the coarse classification of this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Http { .. } => FailureKind::Http,
            Self::Network { .. } => FailureKind::Network,
            Self::Other { .. } => FailureKind::Other,
        }
    }

    /// Returns the failure code, falling back to the HTTP status for `Http`
    pub fn code(&self) -> Option<String> {
        match self {
            Self::Http { code, status, .. } => {
                code.clone().or_else(|| Some(status.to_string()))
            }
            Self::Network { code, .. } => code.clone(),
            Self::Other { .. } => None,
        }
    }

    /// Returns the human-readable failure message
    pub fn message(&self) -> &str {
        match self {
            Self::Http { message, .. } | Self::Network { message, .. } | Self::Other { message } => {
                message
            }
        }
    }
}

/// Result type alias for seo-sweep operations
pub type Result<T> = std::result::Result<T, SeoSweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analysis::{Analyzer, PageRuleAnalyzer, RawFinding, SourceReport};
pub use config::Config;
pub use crawler::{AttemptLog, AttemptResult};
pub use output::{aggregate_run, Plan, Severity, Task};
pub use storage::{ArtifactKind, Run, RunStore};
pub use url::{resolve_candidates, Candidate};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_code_falls_back_to_status() {
        let err = TransportError::Http {
            url: "https://example.com".to_string(),
            status: 404,
            code: None,
            message: "Request failed with status code 404".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Http);
        assert_eq!(err.code(), Some("404".to_string()));
    }

    #[test]
    fn test_transport_error_serializes_with_type_tag() {
        let err = TransportError::Network {
            url: "https://example.com".to_string(),
            code: Some("ECONNRESET".to_string()),
            message: "connection reset".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "network");
        assert_eq!(json["code"], "ECONNRESET");
        assert_eq!(json["message"], "connection reset");
    }

    #[test]
    fn test_other_error_has_no_code() {
        let err = TransportError::Other {
            message: "boom".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Other);
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "boom");
    }
}
