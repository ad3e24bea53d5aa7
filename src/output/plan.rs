//! Run aggregation into a remediation plan

use crate::crawler::read_crawl_report;
use crate::output::report::{format_executive_summary, format_task_list};
use crate::output::tasks::{error_task, map_findings_to_tasks, rank_tasks, Task};
use crate::storage::{ArtifactKind, Run, StorageResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const PLAN_JSON: &str = "project-plan.json";
pub const TASKS_TXT: &str = "project-tasks.txt";
pub const EXECUTIVE_SUMMARY_TXT: &str = "executive-summary.txt";

/// Artifact counts reported in the plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCounts {
    pub results: usize,
    pub errors: usize,
    pub discovered: usize,
}

/// Contents of `project-plan.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub generated_at: String,
    pub run_path: String,
    pub analyzed_domains: Vec<String>,
    pub errored_domains: Vec<String>,
    pub discovered_roots: Vec<String>,
    pub discovered_links: usize,
    pub artifact_counts: ArtifactCounts,
    pub tasks: Vec<Task>,
}

impl Plan {
    /// Domain named in the executive summary
    pub fn primary_domain(&self) -> &str {
        self.analyzed_domains
            .first()
            .or_else(|| self.discovered_roots.first())
            .map_or("<your website>", String::as_str)
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Skipping malformed JSON in {}: {}", path.display(), e);
            None
        }
    }
}

/// Builds the plan for a run from its artifacts
///
/// Results artifacts are read before error artifacts, each in file-name
/// order. Unreadable results files contribute no tasks; unreadable error
/// files still contribute an `Unknown error` task.
///
/// # Errors
///
/// Returns `StorageError::Read` if the run directory cannot be listed.
pub fn aggregate_run(run: &Run, generated_at: DateTime<Utc>) -> StorageResult<Plan> {
    let results = run.site_artifacts(ArtifactKind::Results)?;
    let errors = run.site_artifacts(ArtifactKind::Error)?;
    tracing::debug!(
        "Aggregating {} results and {} error artifacts from {}",
        results.len(),
        errors.len(),
        run.path().display()
    );

    let mut tasks = Vec::new();
    for artifact in &results {
        if let Some(value) = read_json(&artifact.path) {
            tasks.extend(map_findings_to_tasks(&value, &artifact.site));
        }
    }
    for artifact in &errors {
        let value = read_json(&artifact.path);
        tasks.push(error_task(&artifact.site, value.as_ref()));
    }
    rank_tasks(&mut tasks);

    let crawl = read_crawl_report(run).unwrap_or_default();
    let discovered_links = crawl.total_links();

    Ok(Plan {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        run_path: run.path().display().to_string(),
        analyzed_domains: results.iter().map(|a| a.site.clone()).collect(),
        errored_domains: errors.iter().map(|a| a.site.clone()).collect(),
        discovered_roots: crawl.roots(),
        discovered_links,
        artifact_counts: ArtifactCounts {
            results: results.len(),
            errors: errors.len(),
            discovered: discovered_links,
        },
        tasks,
    })
}

/// Writes `project-plan.json`, `project-tasks.txt` and `executive-summary.txt`
pub fn write_plan_outputs(run: &Run, plan: &Plan) -> StorageResult<Vec<PathBuf>> {
    Ok(vec![
        run.write_json(PLAN_JSON, plan)?,
        run.write_text(TASKS_TXT, &format_task_list(plan))?,
        run.write_text(EXECUTIVE_SUMMARY_TXT, &format_executive_summary(plan))?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CrawlReport, DiscoveredRoot, CRAWLER_JSON};
    use crate::output::tasks::Severity;
    use crate::storage::RunStore;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn new_run(dir: &TempDir) -> Run {
        RunStore::new(dir.path()).create_run().unwrap()
    }

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, second).unwrap()
    }

    #[test]
    fn test_empty_run() {
        let dir = TempDir::new().unwrap();
        let run = new_run(&dir);

        let plan = aggregate_run(&run, at(0)).unwrap();

        assert!(plan.tasks.is_empty());
        assert!(plan.analyzed_domains.is_empty());
        assert_eq!(plan.artifact_counts, ArtifactCounts::default());
        assert_eq!(plan.generated_at, "2024-05-01T12:00:00.000Z");
        assert_eq!(plan.primary_domain(), "<your website>");
    }

    #[test]
    fn test_results_errors_and_crawl_summary() {
        let dir = TempDir::new().unwrap();
        let run = new_run(&dir);

        run.write_site_artifact(
            "https://a.com",
            ArtifactKind::Results,
            &json!([{"source": "https://a.com/", "report": [
                {"title": "Missing social meta properties", "severity": "low"},
                {"rule": "canonicalLinkRule", "severity": "medium"}
            ]}]),
        )
        .unwrap();
        run.write_site_artifact(
            "http://b.com",
            ArtifactKind::Error,
            &json!({"type": "network", "message": "connection refused"}),
        )
        .unwrap();
        run.write_json(
            CRAWLER_JSON,
            &CrawlReport {
                root: "a.com".to_string(),
                discovered: vec![DiscoveredRoot {
                    start: "https://a.com".to_string(),
                    count: 12,
                    links: vec![],
                }],
                errors: vec![],
            },
        )
        .unwrap();

        let plan = aggregate_run(&run, at(0)).unwrap();

        assert_eq!(plan.analyzed_domains, vec!["https://a.com"]);
        assert_eq!(plan.errored_domains, vec!["http://b.com"]);
        assert_eq!(plan.discovered_roots, vec!["https://a.com"]);
        assert_eq!(plan.discovered_links, 12);
        assert_eq!(plan.artifact_counts.discovered, 12);

        let severities: Vec<_> = plan.tasks.iter().map(|t| t.severity.clone()).collect();
        assert_eq!(severities, vec![Severity::High, Severity::Medium, Severity::Low]);
        assert_eq!(plan.tasks[0].canonical_text, "Investigation: connection refused");
        assert_eq!(
            plan.tasks[1].canonical_text,
            "Add canonical link element or fix canonical URLs on https://a.com"
        );
    }

    #[test]
    fn test_malformed_artifacts() {
        let dir = TempDir::new().unwrap();
        let run = new_run(&dir);
        fs::write(run.path().join("https%3A%2F%2Fa.com.results.json"), "{not json").unwrap();
        fs::write(run.path().join("https%3A%2F%2Fb.com.error.json"), "").unwrap();

        let plan = aggregate_run(&run, at(0)).unwrap();

        assert_eq!(plan.artifact_counts.results, 1);
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].canonical_text, "Investigation: Unknown error");
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let run = new_run(&dir);
        run.write_site_artifact(
            "https://a.com",
            ArtifactKind::Results,
            &json!([{"source": "s", "report": [{"title": "Title too long"}]}]),
        )
        .unwrap();

        let first = aggregate_run(&run, at(0)).unwrap();
        write_plan_outputs(&run, &first).unwrap();
        let second = aggregate_run(&run, at(30)).unwrap();

        assert_ne!(first.generated_at, second.generated_at);
        assert_eq!(
            Plan {
                generated_at: String::new(),
                ..first
            },
            Plan {
                generated_at: String::new(),
                ..second
            }
        );
    }

    #[test]
    fn test_write_plan_outputs() {
        let dir = TempDir::new().unwrap();
        let run = new_run(&dir);
        let plan = aggregate_run(&run, at(0)).unwrap();

        let paths = write_plan_outputs(&run, &plan).unwrap();

        assert_eq!(paths.len(), 3);
        let written: Plan =
            serde_json::from_str(&fs::read_to_string(run.path().join(PLAN_JSON)).unwrap()).unwrap();
        assert_eq!(written, plan);
        let tasks = fs::read_to_string(run.path().join(TASKS_TXT)).unwrap();
        assert!(tasks.contains("No actionable tasks found."));
    }
}
