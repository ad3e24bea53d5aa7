//! Analysis orchestration for one target
//!
//! Resolves candidates, creates the run directory, drives the analysis
//! fallback policy and persists the final attempt's outcome under the site
//! actually attempted.

use crate::analysis::Analyzer;
use crate::crawler::attempt::{AttemptResult, ErrorArtifact};
use crate::crawler::fallback::{analyze_with_fallback, AnalysisOutcome};
use crate::output::summarize_reports;
use crate::storage::{ArtifactKind, Run, RunStore, StorageError};
use crate::url::resolve_candidates;
use crate::Result;
use std::path::PathBuf;

/// What `analyze_site` did for one target
#[derive(Debug)]
pub struct SiteOutcome {
    /// Run directory the artifacts were written into
    pub run: Run,
    /// Fallback policy result
    pub analysis: AnalysisOutcome,
    /// Artifacts written successfully
    pub written: Vec<PathBuf>,
    /// Artifacts that could not be written
    pub write_failures: Vec<StorageError>,
}

impl SiteOutcome {
    pub fn is_success(&self) -> bool {
        self.analysis.result.is_success()
    }
}

/// Analyzes one target and persists the outcome into a new run
///
/// # Errors
///
/// - `SeoSweepError::Url` for empty input (nothing is created on disk)
/// - `SeoSweepError::Storage` if the run directory cannot be created
///
/// A failed analysis is not an error: it is persisted as `{site}.error.json`.
pub async fn analyze_site(
    analyzer: &dyn Analyzer,
    store: &RunStore,
    target: &str,
) -> Result<SiteOutcome> {
    let candidates = resolve_candidates(target)?;
    tracing::debug!(
        "Candidates for {}: {}",
        target.trim(),
        candidates
            .iter()
            .map(|c| c.url())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let run = store.create_run()?;
    let analysis = analyze_with_fallback(analyzer, &candidates).await?;

    let (written, write_failures) = persist_outcome(&run, &analysis);
    for failure in &write_failures {
        tracing::warn!("Failed to write artifact for {}: {}", analysis.site(), failure);
    }

    Ok(SiteOutcome {
        run,
        analysis,
        written,
        write_failures,
    })
}

/// Writes the artifacts for one analysis outcome
///
/// | Final attempt | Artifacts |
/// |---------------|-----------|
/// | Success | `results.json`, `raw.log`, `summary.txt` |
/// | Failure | `error.json`, `raw.log` |
///
/// Each write is independent; failures are collected, not propagated.
pub fn persist_outcome(
    run: &Run,
    outcome: &AnalysisOutcome,
) -> (Vec<PathBuf>, Vec<StorageError>) {
    let site = outcome.site();
    let mut results = Vec::new();

    match &outcome.result {
        AttemptResult::Success { payload, raw_logs } => {
            tracing::info!(
                "Analysis of {} produced {} reports",
                site,
                payload.len()
            );
            results.push(run.write_site_artifact(&site, ArtifactKind::Results, payload));
            results.push(run.write_site_artifact(&site, ArtifactKind::RawLog, raw_logs));
            results.push(run.write_site_text(
                &site,
                ArtifactKind::Summary,
                &summarize_reports(payload),
            ));
        }
        AttemptResult::Failure { error, raw_logs } => {
            tracing::error!("Analysis of {} failed: {}", site, error);
            let artifact = ErrorArtifact { error, raw_logs };
            results.push(run.write_site_artifact(&site, ArtifactKind::Error, &artifact));
            results.push(run.write_site_artifact(&site, ArtifactKind::RawLog, raw_logs));
        }
    }

    let mut written = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(path) => written.push(path),
            Err(e) => failures.push(e),
        }
    }
    (written, failures)
}
