//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the external service
//! traits, allowing full resolution pipelines to run without a live
//! index or metadata API.
//!
//! # Example
//!
//! ```rust,ignore
//! use pramen_core::testing::{fixtures, MockMetadataProvider, MockPageFetcher};
//!
//! let fetcher = MockPageFetcher::new();
//! let metadata = MockMetadataProvider::new();
//!
//! // Configure mock responses
//! metadata.set_meta("tt0133093", fixtures::movie_meta("The Matrix", 1999)).await;
//! fetcher.set_page("/hledej/The%20Matrix%201999", &fixtures::listing_page(&[
//!     fixtures::video_card("/matrix-cz", "The Matrix CZ", "4,2 GB", "02:16:05"),
//! ])).await;
//!
//! // Wire into a StreamResolver...
//! ```

mod mock_fetcher;
mod mock_metadata;

pub use mock_fetcher::MockPageFetcher;
pub use mock_metadata::MockMetadataProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::metadata::CanonicalMeta;

    /// Wrap listing cards in a full index results page.
    pub fn listing_page(cards: &[String]) -> String {
        format!(
            "<html><body><div class=\"list\">{}</div></body></html>",
            cards.join("\n")
        )
    }

    /// One listing card in the index's server-rendered markup.
    pub fn video_card(href: &str, title: &str, size: &str, time: &str) -> String {
        format!(
            r#"<div class="video">
                <a href="{href}"><span class="title">{title}</span></a>
                <span class="size">{size}</span><span class="time">{time}</span>
            </div>"#
        )
    }

    /// A detail page whose player config carries the given source.
    pub fn detail_page(playback_url: &str) -> String {
        format!(
            r#"<html><body>
                <h1>Video</h1>
                <script>
                    var player = initPlayer({{
                        sources: [{{ file: "{playback_url}", type: "auto" }}]
                    }});
                </script>
            </body></html>"#
        )
    }

    /// A detail page with no playable source at all.
    pub fn empty_detail_page() -> String {
        "<html><body><h1>Video</h1><p>Soubor není k dispozici.</p></body></html>".to_string()
    }

    /// The target a search for `query` is fetched from.
    pub fn search_target(search_path: &str, query: &str) -> String {
        format!("{}{}", search_path, urlencoding::encode(query))
    }

    /// Canonical metadata for a movie with a known release year.
    pub fn movie_meta(title: &str, year: u16) -> CanonicalMeta {
        CanonicalMeta {
            title: title.to_string(),
            alternate_titles: Vec::new(),
            year: Some(year),
        }
    }

    /// Canonical metadata for a series title.
    pub fn series_meta(title: &str) -> CanonicalMeta {
        CanonicalMeta {
            title: title.to_string(),
            alternate_titles: Vec::new(),
            year: None,
        }
    }
}
