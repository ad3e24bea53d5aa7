//! Link discovery for one root URL
//!
//! Fetches the root (trying every candidate scheme), records its absolute
//! outbound links into `crawler.json`, and appends a human-readable trace to
//! `crawler.raw.log`.

use crate::crawler::fallback::fetch_with_fallback;
use crate::crawler::parser::extract_absolute_links;
use crate::storage::{Run, RunStore, StorageError};
use crate::url::resolve_candidates;
use crate::{Result, SeoSweepError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;

/// Run-level discovery document
pub const CRAWLER_JSON: &str = "crawler.json";

/// Run-level discovery trace
pub const CRAWLER_RAW_LOG: &str = "crawler.raw.log";

/// Links found on one successfully fetched root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredRoot {
    /// Candidate URL that was fetched
    pub start: String,
    /// Number of absolute links found (before truncation)
    pub count: usize,
    /// First `max_links` links, verbatim
    #[serde(default)]
    pub links: Vec<String>,
}

/// One candidate that could not be fetched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub url: String,
    pub error: String,
}

/// Contents of `crawler.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub discovered: Vec<DiscoveredRoot>,
    #[serde(default)]
    pub errors: Vec<CrawlFailure>,
}

impl CrawlReport {
    /// Sum of `count` over every discovered root
    pub fn total_links(&self) -> usize {
        self.discovered.iter().map(|d| d.count).sum()
    }

    /// Start URLs of every discovered root
    pub fn roots(&self) -> Vec<String> {
        self.discovered.iter().map(|d| d.start.clone()).collect()
    }
}

/// Returns the directory discovery output goes to
///
/// This is the most recent run, or the reports root itself when no run exists
/// yet (the root is created in that case).
pub fn discovery_target(store: &RunStore) -> Result<Run> {
    if let Some(run) = store.latest_run()? {
        return Ok(run);
    }

    fs::create_dir_all(store.root()).map_err(|source| StorageError::CreateDir {
        path: store.root().to_path_buf(),
        source,
    })?;
    Ok(Run::open(store.root()))
}

/// Discovers outbound links from `root`
///
/// # Errors
///
/// - `SeoSweepError::Url` for empty input
/// - `SeoSweepError::Storage` when the target directory or `crawler.json`
///   cannot be written
/// - `SeoSweepError::AllFetchAttemptsFailed` when no candidate could be
///   fetched (`crawler.json` is still written with the errors)
pub async fn discover_links(
    client: &Client,
    store: &RunStore,
    root: &str,
    max_links: usize,
) -> Result<CrawlReport> {
    let candidates = resolve_candidates(root)?;
    let run = discovery_target(store)?;
    tracing::info!("Writing discovery output to {}", run.path().display());

    let outcome = fetch_with_fallback(client, &candidates).await;

    let mut report = CrawlReport {
        root: root.trim().to_string(),
        ..CrawlReport::default()
    };
    let mut trace = Vec::new();

    for failure in &outcome.failures {
        trace.push(format!(
            "Error crawling {}: {}",
            failure.url,
            failure.error.message()
        ));
        report.errors.push(CrawlFailure {
            url: failure.url.clone(),
            error: failure.error.message().to_string(),
        });
    }

    if let Some((candidate, page)) = &outcome.success {
        let links = extract_absolute_links(&page.body);
        let start = candidate.url();
        tracing::info!("Crawled: {} - found {} links", start, links.len());

        trace.push(format!("Crawled: {} - found {} links", start, links.len()));
        let kept: Vec<String> = links.iter().take(max_links).cloned().collect();
        for link in &kept {
            trace.push(format!("  Found: {}", link));
        }

        report.discovered.push(DiscoveredRoot {
            start,
            count: links.len(),
            links: kept,
        });
    } else {
        let attempted: Vec<String> = candidates.iter().map(|c| c.url()).collect();
        trace.push(format!(
            "Crawl failed for all candidates: {}",
            attempted.join(", ")
        ));
    }

    for line in &trace {
        if let Err(e) = run.append_line(CRAWLER_RAW_LOG, line) {
            tracing::warn!("Failed to append to {}: {}", CRAWLER_RAW_LOG, e);
        }
    }

    run.write_json(CRAWLER_JSON, &report)?;

    if outcome.success.is_none() {
        tracing::error!("Crawl failed for all candidates of {}", report.root);
        return Err(SeoSweepError::AllFetchAttemptsFailed { root: report.root });
    }

    Ok(report)
}

/// Reads `crawler.json` from a run, if present and well-formed
pub fn read_crawl_report(run: &Run) -> Option<CrawlReport> {
    let path = run.path().join(CRAWLER_JSON);
    let text = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}
