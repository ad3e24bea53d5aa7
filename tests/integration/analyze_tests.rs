use seo_sweep::config::Config;
use seo_sweep::crawler::analyze_site;
use seo_sweep::storage::{ArtifactKind, RunStore};
use seo_sweep::{AttemptLog, FailureKind, PageRuleAnalyzer};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><head>
    <title>Hi</title>
    </head><body>
    <h1>Welcome</h1>
    <img src="/logo.png">
    </body></html>"#;

async fn mount_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn host_of(server: &MockServer) -> String {
    server
        .uri()
        .strip_prefix("http://")
        .expect("mock server uri is http")
        .to_string()
}

#[tokio::test]
async fn test_https_network_failure_falls_back_to_http() {
    let server = MockServer::start().await;
    mount_page(&server).await;

    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path().join("reports"));
    let analyzer = PageRuleAnalyzer::from_config(&Config::default()).unwrap();

    // Bare host: https:// is tried first and cannot complete a TLS handshake
    // against the plain-HTTP mock server
    let outcome = analyze_site(&analyzer, &store, &host_of(&server))
        .await
        .unwrap();

    assert!(outcome.analysis.fell_back());
    assert!(outcome.is_success());

    let site = format!("http://{}", host_of(&server));
    assert_eq!(outcome.analysis.site(), site);

    let run = &outcome.run;
    let results = run.site_artifacts(ArtifactKind::Results).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].site, site);
    assert!(results[0].file_name.starts_with("http%3A%2F%2F127.0.0.1"));
    assert!(run.site_artifacts(ArtifactKind::Error).unwrap().is_empty());

    let raw: AttemptLog =
        serde_json::from_str(&fs::read_to_string(run.artifact_path(&site, ArtifactKind::RawLog)).unwrap())
            .unwrap();
    assert_eq!(raw.log[0], format!("Analyzing {}", site));

    let findings: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&results[0].path).unwrap()).unwrap();
    let rules: Vec<&str> = findings[0]["report"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["rule"].as_str())
        .collect();
    assert!(rules.contains(&"titleLengthRule"));
    assert!(rules.contains(&"imgTagWithAltAttributeRule"));
    assert!(rules.contains(&"canonicalLinkRule"));

    let summary =
        fs::read_to_string(run.artifact_path(&site, ArtifactKind::Summary)).unwrap();
    assert!(summary.starts_with("Total issues: "));
}

#[tokio::test]
async fn test_http_404_writes_single_error_without_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());
    let analyzer = PageRuleAnalyzer::from_config(&Config::default()).unwrap();

    let outcome = analyze_site(&analyzer, &store, &server.uri()).await.unwrap();

    assert!(!outcome.analysis.fell_back());
    assert_eq!(outcome.analysis.result.kind(), Some(FailureKind::Http));

    let run = &outcome.run;
    let errors = run.site_artifacts(ArtifactKind::Error).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(run.site_artifacts(ArtifactKind::Results).unwrap().is_empty());

    let error: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&errors[0].path).unwrap()).unwrap();
    assert_eq!(error["type"], "http");
    assert_eq!(error["status"], 404);
    assert_eq!(error["message"], "Request failed with status code 404");
    assert!(error["rawLogs"]["error"].as_array().unwrap().len() == 1);
}

#[tokio::test]
async fn test_each_analysis_creates_a_newer_run() {
    let server = MockServer::start().await;
    mount_page(&server).await;

    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());
    let analyzer = PageRuleAnalyzer::from_config(&Config::default()).unwrap();

    let first = analyze_site(&analyzer, &store, &server.uri()).await.unwrap();
    let second = analyze_site(&analyzer, &store, &server.uri()).await.unwrap();

    assert!(second.run.id() > first.run.id());
    assert_eq!(store.latest_run().unwrap().unwrap().id(), second.run.id());
}
