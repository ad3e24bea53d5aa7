//! Storage module for persisting run artifacts
//!
//! This module owns the run directory lifecycle:
//! - Creating the reports root and a strictly increasing timestamped run directory
//! - Locating the most recent run by lexicographic order of run ids
//! - Naming and atomically writing per-site artifacts
//! - Listing per-site artifacts for aggregation

mod run_store;

pub use run_store::{format_run_id, Run, RunStore, SiteArtifact};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Per-site artifact types written into a run directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// `{site}.results.json` - analyzer findings
    Results,
    /// `{site}.error.json` - classified failure
    Error,
    /// `{site}.raw.log` - diagnostics captured during the attempt
    RawLog,
    /// `{site}.summary.txt` - per-source issue counts
    Summary,
}

impl ArtifactKind {
    /// Returns the file-name suffix for this artifact kind
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Results => ".results.json",
            Self::Error => ".error.json",
            Self::RawLog => ".raw.log",
            Self::Summary => ".summary.txt",
        }
    }

    /// Returns the kind that must not coexist with this one for the same site
    pub fn exclusive_with(&self) -> Option<Self> {
        match self {
            Self::Results => Some(Self::Error),
            Self::Error => Some(Self::Results),
            Self::RawLog | Self::Summary => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes_are_distinct() {
        let kinds = [
            ArtifactKind::Results,
            ArtifactKind::Error,
            ArtifactKind::RawLog,
            ArtifactKind::Summary,
        ];
        for a in &kinds {
            for b in &kinds {
                if a != b {
                    assert_ne!(a.suffix(), b.suffix());
                }
            }
        }
    }

    #[test]
    fn test_results_and_error_are_exclusive() {
        assert_eq!(
            ArtifactKind::Results.exclusive_with(),
            Some(ArtifactKind::Error)
        );
        assert_eq!(
            ArtifactKind::Error.exclusive_with(),
            Some(ArtifactKind::Results)
        );
        assert_eq!(ArtifactKind::RawLog.exclusive_with(), None);
    }
}
