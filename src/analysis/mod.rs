//! Analyzer seam and the built-in page rule analyzer
//!
//! The pipeline only depends on the [`Analyzer`] trait: it hands over a URL and
//! a per-attempt log, and gets back either a findings array or a classified
//! [`TransportError`]. [`PageRuleAnalyzer`] is the implementation the CLI uses.

mod robots;
mod rules;

pub use robots::{count_sitemap_urls, probe_site_files, ParsedRobots};
pub use rules::{evaluate_page, PageRuleAnalyzer};

use crate::crawler::AttemptLog;
use crate::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Severity labels used by the built-in rules
pub mod severity {
    pub const CRITICAL: &str = "critical";
    pub const HIGH: &str = "high";
    pub const MEDIUM: &str = "medium";
    pub const LOW: &str = "low";
}

/// One raw issue as reported by an analyzer
///
/// Every field is optional because analyzers disagree on naming: the
/// aggregator reads `title | rule | message` for the title and
/// `description | msg | message` for the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RawFinding {
    /// Builds a finding in the shape the built-in rules emit
    pub fn new(rule: &str, severity: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            rule: Some(rule.to_string()),
            severity: Some(severity.to_string()),
            description: Some(description.into()),
            ..Self::default()
        }
    }
}

/// Findings for one analyzed source (usually one URL)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(default)]
    pub report: Vec<RawFinding>,
}

/// An SEO rule engine invoked once per attempt
///
/// Implementations write their diagnostics into `log` rather than the global
/// subscriber so each attempt's output can be persisted on its own.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyzes `url` and returns its findings
    ///
    /// # Errors
    ///
    /// Returns a classified [`TransportError`] when the page cannot be
    /// retrieved. Rule violations are findings, never errors.
    async fn analyze(
        &self,
        url: &str,
        log: &mut AttemptLog,
    ) -> Result<Vec<SourceReport>, TransportError>;
}
