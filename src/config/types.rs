use serde::Deserialize;

/// Main configuration structure for seo-sweep
///
/// Every section is optional in the TOML file and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub crawler: CrawlerConfig,
    pub rules: RuleConfig,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory under which timestamped run directories are created
    #[serde(rename = "reports-dir")]
    pub reports_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: "reports".to_string(),
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "seo-sweep".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/seo-sweep/seo-sweep".to_string(),
        }
    }
}

/// Link discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of links recorded verbatim per crawled page
    #[serde(rename = "max-links")]
    pub max_links: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_links: crate::crawler::MAX_LINKS,
        }
    }
}

/// Rule configuration handed to the analyzer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    #[serde(rename = "title-min")]
    pub title_min: usize,

    #[serde(rename = "title-max")]
    pub title_max: usize,

    #[serde(rename = "meta-description-min")]
    pub meta_description_min: usize,

    #[serde(rename = "meta-description-max")]
    pub meta_description_max: usize,

    /// `og:` / `twitter:` properties every page should declare
    #[serde(rename = "social-properties")]
    pub social_properties: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            title_min: 10,
            title_max: 50,
            meta_description_min: 50,
            meta_description_max: 160,
            social_properties: [
                "og:url",
                "og:type",
                "og:site_name",
                "og:title",
                "og:description",
                "og:image",
                "og:image:width",
                "og:image:height",
                "twitter:card",
                "twitter:text:title",
                "twitter:description",
                "twitter:image:src",
                "twitter:url",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        }
    }
}
