//! Findings, canonical task texts and severity ranking

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Severity of a finding or task
///
/// Known labels are matched case-insensitively; anything else is kept
/// verbatim and ranks like `medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    pub fn parse(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Other(label.to_string()),
        }
    }

    /// Sort weight: critical 4, high 3, medium 2, low 1, unknown 2
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium | Self::Other(_) => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Other(label) => label,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

/// A normalized finding read from a results artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub source: String,
    pub rule: Option<String>,
    pub title: String,
    pub severity: Severity,
    pub description: String,
}

/// One remediation task in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub site: String,
    pub source: String,
    pub title: String,
    pub severity: Severity,
    #[serde(rename = "task")]
    pub canonical_text: String,
}

/// One entry of the canonicalization table
pub struct CanonicalRule {
    pub name: &'static str,
    pub matches: fn(&Finding) -> bool,
    pub template: fn(&str) -> String,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn rule_contains_ci(finding: &Finding, needle: &str) -> bool {
    finding
        .rule
        .as_deref()
        .map_or(false, |rule| contains_ci(rule, needle))
}

fn is_meta_description(f: &Finding) -> bool {
    contains_ci(&f.title, "meta description")
        || rule_contains_ci(f, "metadescription")
        || rule_contains_ci(f, "meta description")
}

fn is_title(f: &Finding) -> bool {
    contains_ci(&f.title, "title") || rule_contains_ci(f, "titlelengthrule")
}

fn is_image_alt(f: &Finding) -> bool {
    contains_ci(&f.title, "img") || contains_ci(&f.description, "alt")
}

fn is_canonical(f: &Finding) -> bool {
    contains_ci(&f.title, "canonical") || rule_contains_ci(f, "canonicallinkrule")
}

fn meta_description_task(site: &str) -> String {
    format!(
        "Add or improve meta description on {} — recommended length 50–160 characters",
        site
    )
}

fn title_task(site: &str) -> String {
    format!(
        "Fix title length on {} — target 10–60 characters and include primary keyword",
        site
    )
}

fn image_alt_task(site: &str) -> String {
    format!(
        "Add descriptive alt attributes to images missing them on {}",
        site
    )
}

fn canonical_task(site: &str) -> String {
    format!(
        "Add canonical link element or fix canonical URLs on {}",
        site
    )
}

/// Canonicalization table, evaluated in order; the first match wins
pub static CANONICAL_RULES: &[CanonicalRule] = &[
    CanonicalRule {
        name: "meta-description",
        matches: is_meta_description,
        template: meta_description_task,
    },
    CanonicalRule {
        name: "title",
        matches: is_title,
        template: title_task,
    },
    CanonicalRule {
        name: "image-alt",
        matches: is_image_alt,
        template: image_alt_task,
    },
    CanonicalRule {
        name: "canonical",
        matches: is_canonical,
        template: canonical_task,
    },
];

/// Returns the canonical task text for a finding
pub fn canonical_text(finding: &Finding, site: &str) -> String {
    CANONICAL_RULES
        .iter()
        .find(|rule| (rule.matches)(finding))
        .map(|rule| (rule.template)(site))
        .unwrap_or_else(|| format!("{} — {}", finding.title, finding.description))
}

/// Reads a field as text, treating absent, null, false, zero and "" as missing
fn field_text(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

fn first_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| field_text(item, key))
}

/// Normalizes one raw report item into a [`Finding`]
///
/// - title: `title | rule | message | "Issue"`
/// - description: `description | msg | message | <item JSON>`
/// - severity: `severity | medium`
///
/// A bare string item becomes a finding titled `Issue` described by the string.
pub fn finding_from_value(source: &str, item: &Value) -> Finding {
    if let Value::String(text) = item {
        return Finding {
            source: source.to_string(),
            rule: None,
            title: "Issue".to_string(),
            severity: Severity::Medium,
            description: text.clone(),
        };
    }

    Finding {
        source: source.to_string(),
        rule: field_text(item, "rule"),
        title: first_field(item, &["title", "rule", "message"])
            .unwrap_or_else(|| "Issue".to_string()),
        severity: field_text(item, "severity")
            .map(Severity::from)
            .unwrap_or_default(),
        description: first_field(item, &["description", "msg", "message"])
            .unwrap_or_else(|| item.to_string()),
    }
}

/// Maps a parsed results artifact to tasks, one per finding
///
/// Anything other than an array of `{source, report: [...]}` yields no tasks.
pub fn map_findings_to_tasks(results: &Value, site: &str) -> Vec<Task> {
    let Some(sources) = results.as_array() else {
        return Vec::new();
    };

    let mut tasks = Vec::new();
    for entry in sources {
        let source = field_text(entry, "source").unwrap_or_else(|| "unknown".to_string());
        let items = entry
            .get("report")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for item in items {
            let finding = finding_from_value(&source, item);
            tasks.push(Task {
                site: site.to_string(),
                canonical_text: canonical_text(&finding, site),
                source: finding.source,
                title: finding.title,
                severity: finding.severity,
            });
        }
    }
    tasks
}

/// Builds the task recorded for a site whose analysis failed
///
/// `error` is the parsed error artifact, or `None` when it could not be read.
pub fn error_task(site: &str, error: Option<&Value>) -> Task {
    let message = error
        .and_then(|value| field_text(value, "message"))
        .unwrap_or_else(|| "Unknown error".to_string());

    Task {
        site: site.to_string(),
        source: "error".to_string(),
        title: format!("Analysis failed for {}", site),
        severity: Severity::High,
        canonical_text: format!("Investigation: {}", message),
    }
}

/// Sorts tasks by descending severity rank, keeping input order within a rank
pub fn rank_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
}
