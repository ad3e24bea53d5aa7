use seo_sweep::config::Config;
use seo_sweep::crawler::{
    build_http_client, discover_links, read_crawl_report, CRAWLER_JSON, CRAWLER_RAW_LOG,
};
use seo_sweep::storage::RunStore;
use seo_sweep::SeoSweepError;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> reqwest::Client {
    let config = Config::default();
    build_http_client(&config.user_agent, &config.fetch).unwrap()
}

#[tokio::test]
async fn test_crawl_writes_into_latest_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="https://partner.example.org/">Partner</a>
                <a href="/about">About</a>
                <a href="http://blog.example.com/post?id=1">Blog</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());
    store.create_run().unwrap();
    let latest = store.create_run().unwrap();

    let report = discover_links(&test_client(), &store, &format!("{}/", server.uri()), 30)
        .await
        .unwrap();

    assert_eq!(report.discovered.len(), 1);
    assert_eq!(
        report.discovered[0].links,
        vec![
            "https://partner.example.org/",
            "http://blog.example.com/post?id=1"
        ]
    );
    assert!(report.errors.is_empty());

    assert!(latest.path().join(CRAWLER_JSON).exists());
    assert_eq!(read_crawl_report(&latest).unwrap(), report);

    let trace = fs::read_to_string(latest.path().join(CRAWLER_RAW_LOG)).unwrap();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("Crawled: {}/ - found 2 links", server.uri()).as_str(),
            "  Found: https://partner.example.org/",
            "  Found: http://blog.example.com/post?id=1",
        ]
    );
}

#[tokio::test]
async fn test_crawl_without_runs_writes_to_reports_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("reports");
    let store = RunStore::new(&root);

    discover_links(&test_client(), &store, &server.uri(), 30)
        .await
        .unwrap();

    assert!(root.join(CRAWLER_JSON).exists());
    assert!(store.latest_run().unwrap().is_none());
}

#[tokio::test]
async fn test_crawl_falls_through_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="https://example.com/">x</a>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());
    let run = store.create_run().unwrap();

    // https:// first fails against the plain-HTTP server, http:// succeeds
    let host = server.uri().replace("http://", "https://");
    let report = discover_links(&test_client(), &store, &host, 30)
        .await
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].url.starts_with("https://"));
    assert_eq!(report.discovered[0].start, server.uri());

    let trace = fs::read_to_string(run.path().join(CRAWLER_RAW_LOG)).unwrap();
    assert!(trace.starts_with("Error crawling https://"));
}

#[tokio::test]
async fn test_crawl_missing_target_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = RunStore::new(dir.path());

    let err = discover_links(&test_client(), &store, "", 30)
        .await
        .unwrap_err();

    assert!(matches!(err, SeoSweepError::Url(_)));
}
