//! Site key normalization
//!
//! Site strings become artifact file-name prefixes, so they are percent-encoded
//! into a single path segment. The encoding matches `application/x-www-form-urlencoded`
//! byte serialization: alphanumerics and `*-._` pass through, everything else
//! (including `:` and `/`) is escaped.

use url::form_urlencoded;

/// Removes one trailing `/` from a site string
///
/// # Examples
///
/// ```
/// use seo_sweep::url::storage_key;
///
/// assert_eq!(storage_key("https://example.com/"), "https://example.com");
/// assert_eq!(storage_key("https://example.com"), "https://example.com");
/// ```
pub fn storage_key(site: &str) -> &str {
    site.strip_suffix('/').unwrap_or(site)
}

/// Encodes a site string into a filesystem-safe artifact key
///
/// # Examples
///
/// ```
/// use seo_sweep::url::encode_site_key;
///
/// assert_eq!(encode_site_key("http://example.com"), "http%3A%2F%2Fexample.com");
/// ```
pub fn encode_site_key(site: &str) -> String {
    form_urlencoded::byte_serialize(storage_key(site).as_bytes()).collect()
}

/// Decodes an artifact key back into the site string
pub fn decode_site_key(key: &str) -> String {
    // Encoded keys never contain a literal '&' or '=', so the whole key parses
    // as a single name with an empty value.
    form_urlencoded::parse(key.as_bytes())
        .next()
        .map(|(name, _)| name.into_owned())
        .unwrap_or_default()
}
