//! URL handling module for seo-sweep
//!
//! This module turns a user-supplied host or URL into ordered, scheme-qualified
//! candidates and derives the filesystem-safe keys under which per-site
//! artifacts are stored.

mod normalize;

use crate::{UrlError, UrlResult};
use std::fmt;

pub use normalize::{decode_site_key, encode_site_key, storage_key};

const HTTPS_PREFIX: &str = "https://";
const HTTP_PREFIX: &str = "http://";

/// Scheme of a candidate URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Https => HTTPS_PREFIX,
            Self::Http => HTTP_PREFIX,
        }
    }

    fn other(&self) -> Self {
        match self {
            Self::Https => Self::Http,
            Self::Http => Self::Https,
        }
    }
}

/// One scheme-qualified URL variant considered for a target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    scheme: Scheme,
    rest: String,
}

impl Candidate {
    /// Parses an absolute `http://` or `https://` URL string
    ///
    /// Returns `None` when the string has neither prefix.
    pub fn parse(url: &str) -> Option<Self> {
        split_scheme(url).map(|(scheme, rest)| Self {
            scheme,
            rest: rest.to_string(),
        })
    }

    fn with_scheme(scheme: Scheme, rest: &str) -> Self {
        Self {
            scheme,
            rest: rest.to_string(),
        }
    }

    /// Returns the scheme of this candidate
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns true if this candidate uses `https://`
    pub fn is_https(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// Returns the same URL with the other scheme
    pub fn swap_scheme(&self) -> Self {
        Self::with_scheme(self.scheme.other(), &self.rest)
    }

    /// Returns the absolute URL as fetched (trailing slash preserved)
    pub fn url(&self) -> String {
        format!("{}{}", self.scheme.prefix(), self.rest)
    }

    /// Returns the site string used as the artifact key (trailing slash removed)
    pub fn site(&self) -> String {
        storage_key(&self.url()).to_string()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scheme.prefix(), self.rest)
    }
}

fn split_scheme(url: &str) -> Option<(Scheme, &str)> {
    for scheme in [Scheme::Https, Scheme::Http] {
        let prefix = scheme.prefix();
        let matches = url
            .get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix));
        if matches {
            return Some((scheme, &url[prefix.len()..]));
        }
    }
    None
}

/// Resolves a raw host or URL into ordered candidates, first-tried-first
///
/// | Input | Candidates |
/// |-------|------------|
/// | `https://x` | `[https://x, http://x]` |
/// | `http://x` | `[http://x, https://x]` |
/// | `x` | `[https://x, http://x]` |
///
/// # Errors
///
/// Returns `UrlError::EmptyInput` for empty or whitespace-only input.
///
/// # Examples
///
/// ```
/// use seo_sweep::url::resolve_candidates;
///
/// let candidates = resolve_candidates("example.com").unwrap();
/// let urls: Vec<String> = candidates.iter().map(|c| c.url()).collect();
/// assert_eq!(urls, vec!["https://example.com", "http://example.com"]);
/// ```
pub fn resolve_candidates(raw: &str) -> UrlResult<Vec<Candidate>> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(UrlError::EmptyInput);
    }

    let first = match split_scheme(input) {
        Some((scheme, rest)) => {
            if rest.is_empty() {
                return Err(UrlError::Parse(format!("missing host in '{}'", input)));
            }
            Candidate::with_scheme(scheme, rest)
        }
        None => Candidate::with_scheme(Scheme::Https, input),
    };
    let second = first.swap_scheme();

    Ok(vec![first, second])
}
