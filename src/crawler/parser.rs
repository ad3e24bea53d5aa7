//! HTML link extraction
//!
//! Discovery records outbound references exactly as authored, so only
//! anchors whose `href` is already absolute are kept:
//!
//! **Include:**
//! - `<a href="http://...">` and `<a href="https://...">`
//!
//! **Exclude:**
//! - Relative paths and fragment links
//! - `javascript:`, `mailto:`, `tel:` and data URIs
//! - Anything that is not an `<a>` element

use scraper::{Html, Selector};

/// Extracts absolute `http(s)://` anchor targets in document order
///
/// Links are returned verbatim, without resolution or de-duplication.
///
/// # Example
///
/// ```
/// use seo_sweep::crawler::extract_absolute_links;
///
/// let html = r#"<a href="https://example.com/a">A</a><a href="/b">B</a>"#;
/// assert_eq!(extract_absolute_links(html), vec!["https://example.com/a"]);
/// ```
pub fn extract_absolute_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
        .map(str::to_string)
        .collect()
}
