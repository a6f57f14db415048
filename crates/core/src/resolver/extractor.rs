//! Playback URL extraction from index detail pages.
//!
//! Detail pages embed the actual media URL in one of three shapes: an
//! HLS playlist URL, a direct MP4 URL, or a `file: "..."` field inside
//! an inline player setup. Extraction tries them in that order and
//! validates whatever it finds before handing it out.

use crate::cache::{stream_key, ResultCache};
use crate::fetch::{FetchError, PageFetcher};
use crate::metrics;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

static M3U8_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>]+\.m3u8[^\s"'<>]*"#)
        .expect("Failed to compile extraction pattern")
});

static MP4_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>]+\.mp4[^\s"'<>]*"#)
        .expect("Failed to compile extraction pattern")
});

static FILE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)file\s*:\s*"([^"]+)""#).expect("Failed to compile extraction pattern")
});

static DIRECT_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(m3u8|mp4)(\?|$)").expect("Failed to compile extraction pattern")
});

/// CDN hosts trusted to serve direct media without a telling suffix.
const KNOWN_CDN_HOSTS: &[&str] = &["premiumcdn.net", "pf-storage"];

/// Pulls the first playback URL out of a detail page body.
///
/// HLS playlists win over direct MP4 links, which win over the player's
/// `file: "..."` field. The result must still pass
/// [`is_direct_media_url`], otherwise the page yields nothing.
pub fn extract_playback_url(html: &str) -> Option<String> {
    let found = M3U8_URL
        .find(html)
        .map(|m| m.as_str().to_string())
        .or_else(|| MP4_URL.find(html).map(|m| m.as_str().to_string()))
        .or_else(|| {
            FILE_FIELD
                .captures(html)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        });
    found.filter(|url| is_direct_media_url(url))
}

/// True when a URL plausibly points at playable media: an `.m3u8`
/// or `.mp4` suffix (query string allowed) or a known CDN host.
pub fn is_direct_media_url(url: &str) -> bool {
    if DIRECT_SUFFIX.is_match(url) {
        return true;
    }
    let lower = url.to_lowercase();
    KNOWN_CDN_HOSTS.iter().any(|host| lower.contains(host))
}

/// Fetches detail pages and extracts playback URLs, with caching.
pub struct StreamExtractor {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn ResultCache>,
}

impl StreamExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: Arc<dyn ResultCache>) -> Self {
        Self { fetcher, cache }
    }

    /// Resolves one candidate's detail page to a playback URL.
    ///
    /// `Ok(None)` means the page loaded but exposed no usable stream.
    /// Fetch failures, including blocked interstitial pages, propagate
    /// as errors. Only successful extractions are cached, so transient
    /// page states never stick for the cache TTL.
    pub async fn extract(&self, detail_url: &str) -> Result<Option<String>, FetchError> {
        let key = stream_key(detail_url);
        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                metrics::CACHE_LOOKUPS
                    .with_label_values(&["stream", "hit"])
                    .inc();
                debug!(detail_url, "Stream cache hit");
                return Ok(Some(cached));
            }
            Ok(None) => {
                metrics::CACHE_LOOKUPS
                    .with_label_values(&["stream", "miss"])
                    .inc();
            }
            Err(e) => warn!(detail_url, error = %e, "Stream cache read failed"),
        }

        let page = self.fetcher.fetch_page(detail_url).await?;
        match extract_playback_url(&page.body) {
            Some(url) => {
                debug!(detail_url, mirror = %page.mirror, "Extracted playback URL");
                if let Err(e) = self.cache.set(&key, &url).await {
                    warn!(detail_url, error = %e, "Stream cache write failed");
                }
                Ok(Some(url))
            }
            None => {
                debug!(detail_url, mirror = %page.mirror, "No playback URL on detail page");
                Ok(None)
            }
        }
    }
}
