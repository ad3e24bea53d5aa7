//! Crawler module for fetching, fallback and orchestration
//!
//! This module contains the network-facing half of the pipeline:
//! - Single-attempt execution with per-attempt logs and error classification
//! - Scheme fallback policies for analysis and crawling
//! - Link extraction and discovery for a root URL
//! - Orchestration of one analysis run

mod attempt;
mod coordinator;
mod discovery;
mod fallback;
mod fetcher;
mod parser;

pub use attempt::{AttemptLog, AttemptResult, ErrorArtifact};
pub use coordinator::{analyze_site, persist_outcome, SiteOutcome};
pub use discovery::{
    discover_links, discovery_target, read_crawl_report, CrawlFailure, CrawlReport,
    DiscoveredRoot, CRAWLER_JSON, CRAWLER_RAW_LOG,
};
pub use fallback::{
    analyze_with_fallback, fetch_with_fallback, is_network_failure, AnalysisOutcome,
    CandidateFailure, CrawlOutcome,
};
pub use fetcher::{
    build_http_client, classify_reqwest_error, execute_analysis, execute_fetch, fetch_page,
    FetchedPage,
};
pub use parser::extract_absolute_links;

/// Default cap on links recorded per crawled page
pub const MAX_LINKS: usize = 30;
