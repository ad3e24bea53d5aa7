//! HTTP fetcher implementation
//!
//! This module executes exactly one network operation per call:
//! - Building HTTP clients with a proper user agent and fixed timeouts
//! - GET requests for crawling
//! - One full analyzer invocation for SEO checking
//! - Error classification into Http / Network / Other

use crate::analysis::{Analyzer, SourceReport};
use crate::config::{FetchConfig, UserAgentConfig};
use crate::crawler::attempt::{AttemptLog, AttemptResult};
use crate::url::Candidate;
use crate::TransportError;
use reqwest::Client;
use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: String,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use seo_sweep::config::Config;
/// use seo_sweep::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.fetch).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        user_agent.crawler_name, user_agent.crawler_version, user_agent.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends one GET request and reads the body
///
/// Any non-2xx response is an `Http` failure. Progress and failures are
/// recorded into `log`.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    log: &mut AttemptLog,
) -> Result<FetchedPage, TransportError> {
    log.log(format!("GET {}", url));

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = classify_reqwest_error(url, &e);
            log.error(error.to_string());
            return Err(error);
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        let error = TransportError::Http {
            url: final_url,
            status: status.as_u16(),
            code: None,
            message: format!("Request failed with status code {}", status.as_u16()),
        };
        log.error(error.to_string());
        return Err(error);
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.text().await {
        Ok(body) => {
            log.log(format!(
                "{} {} ({} bytes)",
                status.as_u16(),
                final_url,
                body.len()
            ));
            Ok(FetchedPage {
                final_url,
                status_code: status.as_u16(),
                content_type,
                body,
            })
        }
        Err(e) => {
            let error = classify_reqwest_error(url, &e);
            log.error(error.to_string());
            Err(error)
        }
    }
}

/// Executes one crawl fetch against a candidate with its own log
pub async fn execute_fetch(client: &Client, candidate: &Candidate) -> AttemptResult<FetchedPage> {
    let mut log = AttemptLog::new();
    let result = fetch_page(client, &candidate.url(), &mut log).await;
    AttemptResult::from_result(result, log)
}

/// Executes one full analyzer invocation against a candidate with its own log
pub async fn execute_analysis(
    analyzer: &dyn Analyzer,
    candidate: &Candidate,
) -> AttemptResult<Vec<SourceReport>> {
    let mut log = AttemptLog::new();
    let url = candidate.url();
    log.log(format!("Analyzing {}", url));
    let result = analyzer.analyze(&url, &mut log).await;
    AttemptResult::from_result(result, log)
}

/// Classifies a reqwest error
///
/// | Condition | Classification |
/// |-----------|----------------|
/// | Error carries an HTTP status | `Http` |
/// | Connect / DNS / TLS / reset / timeout | `Network` |
/// | Anything else (redirect limit, body decode, builder) | `Other` |
pub fn classify_reqwest_error(url: &str, err: &reqwest::Error) -> TransportError {
    let message = error_chain_message(err);

    if let Some(status) = err.status() {
        return TransportError::Http {
            url: url.to_string(),
            status: status.as_u16(),
            code: None,
            message,
        };
    }

    if err.is_timeout() || err.is_connect() || err.is_request() {
        let code = network_code(err, &message);
        return TransportError::Network {
            url: url.to_string(),
            code,
            message,
        };
    }

    TransportError::Other { message }
}

/// Joins an error with all of its sources, outermost first
fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

/// Derives a socket-style failure code from the error chain
fn network_code(err: &reqwest::Error, message: &str) -> Option<String> {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if let Some(code) = io_error_code(io.kind()) {
                return Some(code.to_string());
            }
        }
        source = inner.source();
    }

    let lowered = message.to_lowercase();
    if err.is_timeout() {
        Some("ETIMEDOUT".to_string())
    } else if lowered.contains("dns error") || lowered.contains("failed to lookup") {
        Some("ENOTFOUND".to_string())
    } else if lowered.contains("connection refused") {
        Some("ECONNREFUSED".to_string())
    } else if lowered.contains("connection reset") {
        Some("ECONNRESET".to_string())
    } else {
        None
    }
}

fn io_error_code(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
        ErrorKind::ConnectionReset => Some("ECONNRESET"),
        ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
        ErrorKind::TimedOut => Some("ETIMEDOUT"),
        _ => None,
    }
}
