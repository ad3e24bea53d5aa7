use chrono::{TimeZone, Utc};
use seo_sweep::analysis::{RawFinding, SourceReport};
use seo_sweep::crawler::{analyze_site, build_http_client, discover_links, AttemptLog};
use seo_sweep::output::{
    aggregate_run, write_plan_outputs, Plan, EXECUTIVE_SUMMARY_TXT, PLAN_JSON, TASKS_TXT,
};
use seo_sweep::storage::{ArtifactKind, RunStore};
use seo_sweep::{Analyzer, Config, Severity, TransportError};
use async_trait::async_trait;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Analyzer returning canned findings without touching the network
struct CannedAnalyzer(Vec<RawFinding>);

#[async_trait]
impl Analyzer for CannedAnalyzer {
    async fn analyze(
        &self,
        url: &str,
        log: &mut AttemptLog,
    ) -> Result<Vec<SourceReport>, TransportError> {
        log.log(format!("canned {}", url));
        Ok(vec![SourceReport {
            source: url.to_string(),
            report: self.0.clone(),
        }])
    }
}

/// Analyzer that always fails with a network error
struct UnreachableAnalyzer;

#[async_trait]
impl Analyzer for UnreachableAnalyzer {
    async fn analyze(
        &self,
        url: &str,
        _log: &mut AttemptLog,
    ) -> Result<Vec<SourceReport>, TransportError> {
        Err(TransportError::Network {
            url: url.to_string(),
            code: Some("ENOTFOUND".to_string()),
            message: format!("dns error: failed to lookup address for {}", url),
        })
    }
}

#[tokio::test]
async fn test_end_to_end_plan() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="https://a.example.com/">a</a><a href="https://b.example.com/">b</a>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());

    let analyzer = CannedAnalyzer(vec![
        RawFinding::new("headingsStructureRule", "low", "Multiple <h1> headings", "2 found"),
        RawFinding::new("metaDescriptionRule", "high", "Missing meta description", "none"),
        RawFinding::new("robotsTxtRule", "critical", "robots.txt blocks the whole site", "x"),
    ]);
    let outcome = analyze_site(&analyzer, &store, "shop.example.com").await.unwrap();
    let run = outcome.run;

    let config = Config::default();
    let client = build_http_client(&config.user_agent, &config.fetch).unwrap();
    discover_links(&client, &store, &server.uri(), 30).await.unwrap();

    let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let plan = aggregate_run(&run, generated_at).unwrap();
    write_plan_outputs(&run, &plan).unwrap();

    assert_eq!(plan.analyzed_domains, vec!["https://shop.example.com"]);
    assert!(plan.errored_domains.is_empty());
    assert_eq!(plan.discovered_roots, vec![server.uri()]);
    assert_eq!(plan.discovered_links, 2);

    let severities: Vec<Severity> = plan.tasks.iter().map(|t| t.severity.clone()).collect();
    assert_eq!(severities, vec![Severity::Critical, Severity::High, Severity::Low]);
    assert_eq!(
        plan.tasks[1].canonical_text,
        "Add or improve meta description on https://shop.example.com — recommended length 50–160 characters"
    );
    assert_eq!(plan.tasks[2].canonical_text, "Multiple <h1> headings — 2 found");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run.path().join(PLAN_JSON)).unwrap()).unwrap();
    assert_eq!(json["generatedAt"], "2024-05-01T12:00:00.000Z");
    assert_eq!(json["artifactCounts"]["results"], 1);
    assert_eq!(json["artifactCounts"]["discovered"], 2);
    assert_eq!(json["tasks"][0]["severity"], "critical");

    let tasks = fs::read_to_string(run.path().join(TASKS_TXT)).unwrap();
    assert!(tasks.contains("1. [CRITICAL] robots.txt blocks the whole site — x (site: https://shop.example.com)"));

    let summary = fs::read_to_string(run.path().join(EXECUTIVE_SUMMARY_TXT)).unwrap();
    assert!(summary.contains("Websites analyzed: https://shop.example.com"));
    assert!(summary.contains("Crawling discovered 2 unique links"));
}

#[tokio::test]
async fn test_failed_analysis_becomes_investigation_task() {
    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());

    let outcome = analyze_site(&UnreachableAnalyzer, &store, "gone.example.com")
        .await
        .unwrap();
    // https:// hit a network failure, so the final outcome is keyed by http://
    assert_eq!(outcome.analysis.site(), "http://gone.example.com");

    let plan = aggregate_run(&outcome.run, Utc::now()).unwrap();

    assert_eq!(plan.errored_domains, vec!["http://gone.example.com"]);
    assert_eq!(plan.tasks.len(), 1);
    assert_eq!(plan.tasks[0].severity, Severity::High);
    assert_eq!(
        plan.tasks[0].canonical_text,
        "Investigation: dns error: failed to lookup address for http://gone.example.com"
    );
    assert_eq!(plan.primary_domain(), "<your website>");
}

#[tokio::test]
async fn test_reaggregation_only_changes_timestamp() {
    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());
    let analyzer = CannedAnalyzer(vec![RawFinding::new(
        "canonicalLinkRule",
        "medium",
        "Missing canonical link",
        "none",
    )]);
    let run = analyze_site(&analyzer, &store, "example.com").await.unwrap().run;
    assert_eq!(run.site_artifacts(ArtifactKind::Results).unwrap().len(), 1);

    let first = aggregate_run(&run, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()).unwrap();
    write_plan_outputs(&run, &first).unwrap();
    let second = aggregate_run(&run, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()).unwrap();
    write_plan_outputs(&run, &second).unwrap();

    let strip = |plan: Plan| Plan {
        generated_at: String::new(),
        ..plan
    };
    assert_eq!(strip(first), strip(second));
}
