//! Page fetching against the content index.
//!
//! The index is served by a set of interchangeable mirrors. Site-relative
//! targets (leading `/`) are resolved against the configured mirror list in
//! priority order; the first mirror that answers with non-blocked content
//! wins and is reported back as provenance. Absolute http(s) targets (CDN
//! hosts, off-site pages) are fetched directly.

mod http;

pub use http::HttpPageFetcher;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// A fetched page plus the endpoint that served it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    /// Base URL of the mirror (or origin of an absolute target) that served
    /// the content.
    pub mirror: String,
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Blocked or challenge page served by {mirror}")]
    Blocked { mirror: String },

    #[error("All mirrors failed: {0:?}")]
    AllMirrorsFailed(HashMap<String, String>),

    #[error("Invalid fetch target: {0}")]
    InvalidTarget(String),
}

/// Abstraction over "fetch a page of text, or fail".
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `target`, which is either a site-relative path (resolved against
    /// the mirror list) or an absolute http(s) URL.
    async fn fetch_page(&self, target: &str) -> Result<FetchedPage, FetchError>;
}

/// Signatures of anti-bot interstitials. A body containing any of these is a
/// challenge page, not index content.
const BLOCKED_MARKERS: &[&str] = &[
    "just a moment",
    "attention required",
    "cf-browser-verification",
    "cf_chl_opt",
    "ddos-guard",
    "verify you are human",
];

/// True when the body looks like an anti-bot challenge rather than content.
pub fn is_blocked_page(body: &str) -> bool {
    let lower = body.to_lowercase();
    BLOCKED_MARKERS.iter().any(|m| lower.contains(m))
}

/// Scheme + host of an absolute URL, used as provenance for off-site fetches.
pub(crate) fn origin_of(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(path_start) => &url[..scheme_end + 3 + path_start],
                None => url,
            }
        }
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_page_detection() {
        assert!(is_blocked_page(
            "<html><title>Just a moment...</title></html>"
        ));
        assert!(is_blocked_page("<div id=\"cf-browser-verification\"></div>"));
        assert!(is_blocked_page("Protected by DDoS-Guard"));
    }

    #[test]
    fn test_regular_page_not_blocked() {
        assert!(!is_blocked_page(
            "<html><body><div class=\"video\"><a href=\"/film\">Film</a></div></body></html>"
        ));
        assert!(!is_blocked_page(""));
    }

    #[test]
    fn test_origin_of_absolute_url() {
        assert_eq!(
            origin_of("https://cdn.example.net/path/video.mp4?x=1"),
            "https://cdn.example.net"
        );
        assert_eq!(origin_of("https://cdn.example.net"), "https://cdn.example.net");
        assert_eq!(origin_of("not-a-url"), "not-a-url");
    }
}
