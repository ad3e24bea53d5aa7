//! robots.txt and sitemap.xml probes
//!
//! Both files are fetched relative to the analyzed page's origin. Transport
//! failures other than an HTTP status are recorded in the attempt log and
//! never become findings.

use crate::analysis::severity::{CRITICAL, LOW};
use crate::analysis::RawFinding;
use crate::crawler::{fetch_page, AttemptLog};
use crate::TransportError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use url::Url;

static SITEMAP_LOC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<loc>(.*?)</loc>").expect("valid sitemap loc pattern"));

/// Parsed robots.txt data
///
/// Wraps the raw content and defers matching to `robotstxt`.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// Empty content allows everything.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Returns true if the site root is closed to `user_agent`
    pub fn blocks_root(&self, origin: &Url, user_agent: &str) -> bool {
        match origin.join("/") {
            Ok(root) => !self.is_allowed(root.as_str(), user_agent),
            Err(_) => false,
        }
    }

    /// Sitemap URLs declared with `Sitemap:` lines
    pub fn sitemaps(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case("sitemap")
                    .then(|| value.trim().to_string())
            })
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// Counts `<loc>` entries in a sitemap document
pub fn count_sitemap_urls(xml: &str) -> usize {
    SITEMAP_LOC_PATTERN
        .captures_iter(xml)
        .filter(|caps| caps.get(1).map_or(false, |m| !m.as_str().trim().is_empty()))
        .count()
}

/// Probes `/robots.txt` and `/sitemap.xml` on the origin of `base`
pub async fn probe_site_files(
    client: &Client,
    base: &Url,
    user_agent: &str,
    log: &mut AttemptLog,
) -> Vec<RawFinding> {
    let mut findings = Vec::new();

    let robots_url = match base.join("/robots.txt") {
        Ok(url) => url,
        Err(e) => {
            log.warn(format!("Cannot build robots.txt URL for {}: {}", base, e));
            return findings;
        }
    };

    let mut sitemap_url = base.join("/sitemap.xml").ok();

    match fetch_page(client, robots_url.as_str(), log).await {
        Ok(page) => {
            let robots = ParsedRobots::from_content(&page.body);
            if robots.blocks_root(base, user_agent) {
                findings.push(RawFinding::new(
                    "robotsTxtRule",
                    CRITICAL,
                    "robots.txt blocks the whole site",
                    format!("{} disallows crawling of /", robots_url),
                ));
            }
            if let Some(declared) = robots.sitemaps().first() {
                sitemap_url = base.join(declared).ok().or(sitemap_url);
            }
        }
        Err(TransportError::Http { status, .. }) => findings.push(RawFinding::new(
            "robotsTxtRule",
            LOW,
            "robots.txt not found",
            format!("{} returned status {}", robots_url, status),
        )),
        Err(e) => log.warn(format!("robots.txt check skipped: {}", e)),
    }

    let Some(sitemap_url) = sitemap_url else {
        return findings;
    };

    match fetch_page(client, sitemap_url.as_str(), log).await {
        Ok(page) => log.log(format!(
            "{} lists {} URLs",
            sitemap_url,
            count_sitemap_urls(&page.body)
        )),
        Err(TransportError::Http { status, .. }) => findings.push(RawFinding::new(
            "sitemapXmlRule",
            LOW,
            "sitemap.xml not found",
            format!("{} returned status {}", sitemap_url, status),
        )),
        Err(e) => log.warn(format!("sitemap.xml check skipped: {}", e)),
    }

    findings
}
