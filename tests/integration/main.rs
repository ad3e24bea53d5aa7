//! Integration tests for seo-sweep
//!
//! These tests use wiremock to serve sites over plain HTTP and tempfile for
//! the reports root, and drive the public pipeline end-to-end.

mod aggregate_tests;
mod analyze_tests;
mod crawl_tests;
