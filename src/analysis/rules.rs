//! Built-in page rules
//!
//! Applies the fixed rule configuration to one HTML document:
//! - `titleLengthRule`: `<title>` present and within bounds
//! - `metaDescriptionRule`: `<meta name="description">` present and within bounds
//! - `imgTagWithAltAttributeRule`: every `<img>` has an `alt` attribute
//! - `headingsStructureRule`: exactly one `<h1>`, no skipped levels
//! - `canonicalLinkRule`: `<link rel="canonical">` present
//! - `metaSocialRule`: configured `og:` / `twitter:` properties present

use crate::analysis::robots::probe_site_files;
use crate::analysis::severity::{HIGH, LOW, MEDIUM};
use crate::analysis::{Analyzer, RawFinding, SourceReport};
use crate::config::{Config, RuleConfig};
use crate::crawler::{build_http_client, fetch_page, AttemptLog};
use crate::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Analyzer that fetches a page and applies [`RuleConfig`] to it
#[derive(Debug, Clone)]
pub struct PageRuleAnalyzer {
    client: Client,
    rules: RuleConfig,
    user_agent: String,
}

impl PageRuleAnalyzer {
    /// Creates an analyzer using an existing HTTP client
    pub fn new(client: Client, rules: RuleConfig, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            rules,
            user_agent: user_agent.into(),
        }
    }

    /// Creates an analyzer with its own client built from the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, &config.fetch)?;
        Ok(Self::new(
            client,
            config.rules.clone(),
            config.user_agent.crawler_name.clone(),
        ))
    }
}

#[async_trait]
impl Analyzer for PageRuleAnalyzer {
    async fn analyze(
        &self,
        url: &str,
        log: &mut AttemptLog,
    ) -> Result<Vec<SourceReport>, TransportError> {
        let page = fetch_page(&self.client, url, log).await?;

        let mut report = evaluate_page(&page.body, &self.rules);
        log.log(format!(
            "{} page rule findings for {}",
            report.len(),
            page.final_url
        ));

        match Url::parse(&page.final_url) {
            Ok(base) => {
                let site_findings =
                    probe_site_files(&self.client, &base, &self.user_agent, log).await;
                report.extend(site_findings);
            }
            Err(e) => log.warn(format!(
                "Skipping robots.txt/sitemap.xml checks for {}: {}",
                page.final_url, e
            )),
        }

        Ok(vec![SourceReport {
            source: page.final_url,
            report,
        }])
    }
}

/// Applies every page rule to an HTML document
///
/// # Example
///
/// ```
/// use seo_sweep::analysis::evaluate_page;
/// use seo_sweep::config::RuleConfig;
///
/// let findings = evaluate_page("<html><head></head><body></body></html>", &RuleConfig::default());
/// assert!(findings.iter().any(|f| f.rule.as_deref() == Some("titleLengthRule")));
/// ```
pub fn evaluate_page(html: &str, rules: &RuleConfig) -> Vec<RawFinding> {
    let document = Html::parse_document(html);

    let mut findings = Vec::new();
    findings.extend(check_title(&document, rules));
    findings.extend(check_meta_description(&document, rules));
    findings.extend(check_img_alt(&document));
    findings.extend(check_headings(&document));
    findings.extend(check_canonical(&document));
    findings.extend(check_social(&document, rules));
    findings
}

fn select_first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .find_map(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn check_length(
    rule: &str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Option<RawFinding> {
    let len = value.chars().count();
    let verdict = if len < min {
        "too short"
    } else if len > max {
        "too long"
    } else {
        return None;
    };

    Some(RawFinding::new(
        rule,
        MEDIUM,
        format!("{} {}", label, verdict),
        format!(
            "{} is {} characters; expected between {} and {}",
            label, len, min, max
        ),
    ))
}

fn check_title(document: &Html, rules: &RuleConfig) -> Option<RawFinding> {
    match select_first_text(document, "title") {
        None => Some(RawFinding::new(
            "titleLengthRule",
            HIGH,
            "Missing <title> tag",
            "Page has no <title> element or it is empty",
        )),
        Some(title) => check_length(
            "titleLengthRule",
            "Title",
            &title,
            rules.title_min,
            rules.title_max,
        ),
    }
}

fn check_meta_description(document: &Html, rules: &RuleConfig) -> Option<RawFinding> {
    match select_first_attr(document, r#"meta[name="description"]"#, "content") {
        None => Some(RawFinding::new(
            "metaDescriptionRule",
            HIGH,
            "Missing meta description",
            "Page has no <meta name=\"description\"> or its content is empty",
        )),
        Some(description) => check_length(
            "metaDescriptionRule",
            "Meta description",
            &description,
            rules.meta_description_min,
            rules.meta_description_max,
        ),
    }
}

fn check_img_alt(document: &Html) -> Option<RawFinding> {
    let selector = Selector::parse("img").ok()?;
    let images: Vec<_> = document.select(&selector).collect();
    let missing = images
        .iter()
        .filter(|img| img.value().attr("alt").is_none())
        .count();

    if missing == 0 {
        return None;
    }

    Some(RawFinding::new(
        "imgTagWithAltAttributeRule",
        MEDIUM,
        "Images without alt attribute",
        format!(
            "{} of {} <img> elements have no alt attribute",
            missing,
            images.len()
        ),
    ))
}

fn check_headings(document: &Html) -> Vec<RawFinding> {
    let mut findings = Vec::new();
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return findings;
    };

    let levels: Vec<u8> = document
        .select(&selector)
        .filter_map(|element| element.value().name().strip_prefix('h')?.parse().ok())
        .collect();

    let h1_count = levels.iter().filter(|&&level| level == 1).count();
    if h1_count == 0 {
        findings.push(RawFinding::new(
            "headingsStructureRule",
            HIGH,
            "Missing <h1> heading",
            "Page has no <h1> element",
        ));
    } else if h1_count > 1 {
        findings.push(RawFinding::new(
            "headingsStructureRule",
            LOW,
            "Multiple <h1> headings",
            format!("Page has {} <h1> elements; expected one", h1_count),
        ));
    }

    if let Some(pair) = levels.windows(2).find(|pair| pair[1] > pair[0] + 1) {
        findings.push(RawFinding::new(
            "headingsStructureRule",
            LOW,
            "Skipped heading level",
            format!("<h{}> is followed by <h{}>", pair[0], pair[1]),
        ));
    }

    findings
}

fn check_canonical(document: &Html) -> Option<RawFinding> {
    if select_first_attr(document, r#"link[rel~="canonical"]"#, "href").is_some() {
        return None;
    }

    Some(RawFinding::new(
        "canonicalLinkRule",
        MEDIUM,
        "Missing canonical link",
        "Page has no <link rel=\"canonical\"> element",
    ))
}

fn check_social(document: &Html, rules: &RuleConfig) -> Option<RawFinding> {
    let missing: Vec<&str> = rules
        .social_properties
        .iter()
        .map(String::as_str)
        .filter(|property| {
            let by_property = format!(r#"meta[property="{}"]"#, property);
            let by_name = format!(r#"meta[name="{}"]"#, property);
            select_first_attr(document, &by_property, "content").is_none()
                && select_first_attr(document, &by_name, "content").is_none()
        })
        .collect();

    if missing.is_empty() {
        return None;
    }

    Some(RawFinding::new(
        "metaSocialRule",
        LOW,
        "Missing social meta properties",
        format!("Missing: {}", missing.join(", ")),
    ))
}
