//! Scheme fallback policies
//!
//! Analysis and crawling share the candidate list but retry differently:
//! - Analysis tries the first candidate and, on a network failure over
//!   `https://`, retries its `http://` swap exactly once.
//! - Crawling tries every candidate in order and stops at the first success.

use crate::analysis::{Analyzer, SourceReport};
use crate::crawler::attempt::{AttemptLog, AttemptResult};
use crate::crawler::fetcher::{execute_analysis, execute_fetch, FetchedPage};
use crate::url::Candidate;
use crate::{FailureKind, TransportError, UrlError};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

static NETWORK_MESSAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)TLS|socket|ECONNRESET|ECONNREFUSED|ENOTFOUND|certificate|connection reset|connection refused|dns error|Client network socket disconnected",
    )
    .expect("valid network message pattern")
});

static NETWORK_CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)ECONNRESET|ECONNREFUSED|ENOTFOUND|ETIMEDOUT|ECONNABORTED")
        .expect("valid network code pattern")
});

/// Returns true if a failure should be treated as a transport failure
///
/// This is the union of the structured kind and the message/code signatures,
/// so an `Other` failure whose message names a socket or TLS problem still
/// qualifies.
pub fn is_network_failure(error: &TransportError) -> bool {
    error.kind() == FailureKind::Network
        || NETWORK_MESSAGE_PATTERN.is_match(error.message())
        || error
            .code()
            .map_or(false, |code| NETWORK_CODE_PATTERN.is_match(&code))
}

/// Result of the analysis fallback policy for one input
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The candidate whose result is final (post-fallback)
    pub candidate: Candidate,
    /// URLs attempted, in order
    pub attempted: Vec<String>,
    /// Result of the final attempt
    pub result: AttemptResult<Vec<SourceReport>>,
}

impl AnalysisOutcome {
    /// Site string under which the outcome is persisted
    pub fn site(&self) -> String {
        self.candidate.site()
    }

    /// Returns true if the `http://` retry was used
    pub fn fell_back(&self) -> bool {
        self.attempted.len() > 1
    }
}

/// Runs the analyzer against the first candidate with a single-hop fallback
///
/// # Policy
///
/// | First attempt | Action |
/// |---------------|--------|
/// | Success | Done |
/// | Network failure on `https://` | Retry once with the `http://` swap |
/// | Network failure on `http://` | Terminal |
/// | Http / Other failure | Terminal |
///
/// # Errors
///
/// Returns `UrlError::EmptyInput` when `candidates` is empty.
pub async fn analyze_with_fallback(
    analyzer: &dyn Analyzer,
    candidates: &[Candidate],
) -> Result<AnalysisOutcome, UrlError> {
    let first = candidates.first().ok_or(UrlError::EmptyInput)?;

    tracing::info!("Analyzing {}", first);
    let result = execute_analysis(analyzer, first).await;

    let error = match result.error().cloned() {
        None => {
            return Ok(AnalysisOutcome {
                candidate: first.clone(),
                attempted: vec![first.url()],
                result,
            })
        }
        Some(error) => error,
    };

    if !is_network_failure(&error) || !first.is_https() {
        tracing::error!("Error analyzing {}: {}", first, error);
        return Ok(AnalysisOutcome {
            candidate: first.clone(),
            attempted: vec![first.url()],
            result,
        });
    }

    let fallback = first.swap_scheme();
    tracing::warn!(
        "Network/TLS error for {}: {} {} - retrying with {}",
        first,
        error.code().unwrap_or_default(),
        error.message(),
        fallback
    );

    let second = execute_analysis(analyzer, &fallback).await;
    if let Some(err) = second.error() {
        tracing::error!("Fallback failed for {}: {}", fallback, err);
    }

    Ok(AnalysisOutcome {
        attempted: vec![first.url(), fallback.url()],
        candidate: fallback,
        result: second,
    })
}

/// One failed crawl candidate
#[derive(Debug, Clone)]
pub struct CandidateFailure {
    pub url: String,
    pub error: TransportError,
    pub raw_logs: AttemptLog,
}

/// Result of the crawl fallback policy for one input
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// First successful candidate and its page
    pub success: Option<(Candidate, FetchedPage)>,
    /// Every candidate that failed before the success (or all of them)
    pub failures: Vec<CandidateFailure>,
}

/// Fetches candidates in order until one succeeds
pub async fn fetch_with_fallback(client: &Client, candidates: &[Candidate]) -> CrawlOutcome {
    let mut outcome = CrawlOutcome::default();

    for candidate in candidates {
        tracing::info!("Crawling: {}", candidate);
        match execute_fetch(client, candidate).await {
            AttemptResult::Success { payload, .. } => {
                outcome.success = Some((candidate.clone(), payload));
                break;
            }
            AttemptResult::Failure { error, raw_logs } => {
                tracing::warn!("Error crawling {}: {}", candidate, error);
                outcome.failures.push(CandidateFailure {
                    url: candidate.url(),
                    error,
                    raw_logs,
                });
            }
        }
    }

    outcome
}
