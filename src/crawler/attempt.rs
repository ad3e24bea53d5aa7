//! Per-attempt outcome and diagnostics
//!
//! Every fetch or analysis attempt owns its own [`AttemptLog`]. The log is
//! handed to whatever runs the attempt and comes back inside the
//! [`AttemptResult`], so diagnostics from different attempts never mix.

use crate::{FailureKind, TransportError};
use serde::{Deserialize, Serialize};

/// Diagnostic lines captured during one attempt, grouped by level
///
/// Serialized as-is into `{site}.raw.log`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptLog {
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default)]
    pub warn: Vec<String>,
    #[serde(default)]
    pub error: Vec<String>,
}

impl AttemptLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an informational line
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Records a warning line
    pub fn warn(&mut self, line: impl Into<String>) {
        self.warn.push(line.into());
    }

    /// Records an error line
    pub fn error(&mut self, line: impl Into<String>) {
        self.error.push(line.into());
    }

    /// Total number of captured lines
    pub fn len(&self) -> usize {
        self.log.len() + self.warn.len() + self.error.len()
    }

    /// True if nothing was captured
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one Fetch Executor call
#[derive(Debug, Clone)]
pub enum AttemptResult<T> {
    Success {
        payload: T,
        raw_logs: AttemptLog,
    },
    Failure {
        error: TransportError,
        raw_logs: AttemptLog,
    },
}

impl<T> AttemptResult<T> {
    /// Builds an attempt result from an operation result and its log
    pub fn from_result(result: Result<T, TransportError>, raw_logs: AttemptLog) -> Self {
        match result {
            Ok(payload) => Self::Success { payload, raw_logs },
            Err(error) => Self::Failure { error, raw_logs },
        }
    }

    /// True for a successful attempt
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the failure, if any
    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// Returns the failure classification, if any
    pub fn kind(&self) -> Option<FailureKind> {
        self.error().map(TransportError::kind)
    }

    /// Returns the diagnostics captured during the attempt
    pub fn raw_logs(&self) -> &AttemptLog {
        match self {
            Self::Success { raw_logs, .. } | Self::Failure { raw_logs, .. } => raw_logs,
        }
    }
}

/// Contents of `{site}.error.json`: the classified failure plus its diagnostics
#[derive(Debug, Serialize)]
pub struct ErrorArtifact<'a> {
    #[serde(flatten)]
    pub error: &'a TransportError,
    #[serde(rename = "rawLogs")]
    pub raw_logs: &'a AttemptLog,
}
