//! Index search: fetches listing pages and scrapes candidate rows.
//!
//! The index is plain server-rendered HTML. Listing rows are recognized
//! by a set of known card selectors; when a layout change empties that
//! set, a fallback over bare site-relative links keeps results flowing
//! in degraded form instead of zeroing them.

use crate::cache::{search_key, ResultCache};
use crate::fetch::{FetchError, PageFetcher};
use crate::metrics;
use crate::resolver::classify::{parse_duration_secs, parse_size_bytes};
use crate::resolver::filter::is_junk_release;
use crate::resolver::types::Candidate;
use crate::resolver::verify::normalize_title;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

static CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".video, .video-item, .box, .item, .thumb")
        .expect("Failed to parse card selector")
});

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Failed to parse link selector"));

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".title").expect("Failed to parse title selector"));

static SIZE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".size").expect("Failed to parse size selector"));

static FALLBACK_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href^='/']").expect("Failed to parse fallback selector"));

/// Runs index searches and turns listing pages into candidates.
pub struct SearchClient {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn ResultCache>,
    search_path: String,
}

impl SearchClient {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<dyn ResultCache>,
        search_path: String,
    ) -> Self {
        Self {
            fetcher,
            cache,
            search_path,
        }
    }

    /// Runs one search against the index.
    ///
    /// Cached results are served without touching the network; fresh
    /// results are cached on success. Fetch failures propagate and
    /// cache trouble only logs, so a broken cache degrades to slower
    /// searches rather than failed ones.
    pub async fn search(&self, query: &str) -> Result<Vec<Candidate>, FetchError> {
        let key = search_key(query);
        match self.cache.get(&key).await {
            Ok(Some(cached)) => match serde_json::from_str::<Vec<Candidate>>(&cached) {
                Ok(candidates) => {
                    metrics::CACHE_LOOKUPS
                        .with_label_values(&["search", "hit"])
                        .inc();
                    debug!(query, count = candidates.len(), "Search cache hit");
                    return Ok(candidates);
                }
                Err(e) => {
                    warn!(query, error = %e, "Discarding unreadable cached search entry")
                }
            },
            Ok(None) => {
                metrics::CACHE_LOOKUPS
                    .with_label_values(&["search", "miss"])
                    .inc();
            }
            Err(e) => warn!(query, error = %e, "Search cache read failed"),
        }

        let target = format!("{}{}", self.search_path, urlencoding::encode(query));
        let page = self.fetcher.fetch_page(&target).await?;
        let candidates = parse_listing(&page.body, &page.mirror);
        debug!(
            query,
            mirror = %page.mirror,
            count = candidates.len(),
            "Parsed search listing"
        );

        match serde_json::to_string(&candidates) {
            Ok(json) => {
                if let Err(e) = self.cache.set(&key, &json).await {
                    warn!(query, error = %e, "Search cache write failed");
                }
            }
            Err(e) => warn!(query, error = %e, "Failed to serialize search results"),
        }

        Ok(candidates)
    }
}

/// One listing row before URL normalization and dedup.
struct RawRow {
    href: String,
    title: String,
    tag_text: String,
    size_bytes: Option<u64>,
}

/// Scrapes candidate rows out of one listing page.
///
/// `mirror` is the origin the page came from; absolute links on that
/// origin are stripped back to site-relative paths so dedup keys and
/// cache entries stay valid across mirrors.
pub fn parse_listing(html: &str, mirror: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut rows = card_rows(&document);
    if rows.is_empty() {
        rows = fallback_rows(&document);
    }

    let mut candidates = Vec::new();
    let mut seen = HashSet::new();
    for row in rows {
        if is_junk_release(&row.title) {
            continue;
        }
        let detail_url = match normalize_detail_url(&row.href, mirror) {
            Some(url) => url,
            None => continue,
        };
        if !seen.insert(detail_url.clone()) {
            continue;
        }
        candidates.push(Candidate {
            detail_url,
            normalized_title: normalize_title(&row.title),
            duration_secs: parse_duration_secs(&row.tag_text),
            raw_title: row.title,
            raw_tag_text: row.tag_text,
            size_bytes: row.size_bytes,
        });
    }
    candidates
}

fn card_rows(document: &Html) -> Vec<RawRow> {
    let mut rows = Vec::new();
    for card in document.select(&CARD_SELECTOR) {
        let link = match card.select(&LINK_SELECTOR).next() {
            Some(link) => link,
            None => continue,
        };
        let href = match link.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        let title = card_title(card, link);
        if title.is_empty() {
            continue;
        }
        let tag_text = collapse_text(card);
        let size_bytes = size_from(card, &tag_text);
        rows.push(RawRow {
            href: href.to_string(),
            title,
            tag_text,
            size_bytes,
        });
    }
    rows
}

fn fallback_rows(document: &Html) -> Vec<RawRow> {
    let mut rows = Vec::new();
    for link in document.select(&FALLBACK_LINK_SELECTOR) {
        let href = match link.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        let title = match link.value().attr("title") {
            Some(title) if !title.trim().is_empty() => title.trim().to_string(),
            _ => collapse_text(link),
        };
        if title.is_empty() {
            continue;
        }
        rows.push(RawRow {
            href: href.to_string(),
            tag_text: title.clone(),
            title,
            size_bytes: None,
        });
    }
    rows
}

/// Title resolution order: a dedicated title element, the link's title
/// attribute, the link text, and finally the whole card text.
fn card_title(card: ElementRef<'_>, link: ElementRef<'_>) -> String {
    if let Some(el) = card.select(&TITLE_SELECTOR).next() {
        let text = collapse_text(el);
        if !text.is_empty() {
            return text;
        }
    }
    if let Some(title) = link.value().attr("title") {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }
    let text = collapse_text(link);
    if !text.is_empty() {
        return text;
    }
    collapse_text(card)
}

fn size_from(card: ElementRef<'_>, tag_text: &str) -> Option<u64> {
    if let Some(el) = card.select(&SIZE_SELECTOR).next() {
        if let Some(bytes) = parse_size_bytes(&collapse_text(el)) {
            return Some(bytes);
        }
    }
    parse_size_bytes(tag_text)
}

fn collapse_text(el: ElementRef<'_>) -> String {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_detail_url(href: &str, mirror: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    if let Some(rest) = href.strip_prefix(mirror) {
        if rest.is_empty() || rest == "/" {
            return None;
        }
        return Some(if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{}", rest)
        });
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    if href.starts_with('/') {
        Some(href.to_string())
    } else {
        Some(format!("/{}", href))
    }
}
