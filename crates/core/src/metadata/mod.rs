//! Canonical metadata lookup.
//!
//! A resolution starts from an opaque media identifier (IMDb-style). The
//! metadata layer turns it into the canonical title, alternate titles, and
//! release year used for query building and identity verification. Cinemeta
//! is the primary source; TMDB can be layered on top for richer titles.

mod cinemeta;
mod tmdb;

pub use cinemeta::CinemetaClient;
pub use tmdb::TmdbClient;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::resolver::MediaType;

/// Canonical identity of a movie or series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMeta {
    /// Primary display title.
    pub title: String,
    /// Alternate titles (original-language title, aliases).
    pub alternate_titles: Vec<String>,
    /// Release year (first year for multi-year series runs).
    pub year: Option<u16>,
}

/// Errors that can occur when looking up canonical metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Trait for canonical-metadata providers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolve a canonical identifier into title / alternates / year.
    async fn canonical_meta(
        &self,
        media_type: MediaType,
        canonical_id: &str,
    ) -> Result<CanonicalMeta, MetadataError>;
}

/// Cinemeta-first provider with optional TMDB refinement.
///
/// When TMDB answers, its title and year take precedence and the Cinemeta
/// title joins the alternates. Either source alone is enough for a
/// resolution; only both failing surfaces an error.
pub struct LayeredMetadataProvider {
    cinemeta: CinemetaClient,
    tmdb: Option<TmdbClient>,
}

impl LayeredMetadataProvider {
    pub fn new(cinemeta: CinemetaClient, tmdb: Option<TmdbClient>) -> Self {
        Self { cinemeta, tmdb }
    }

    fn merge(cinemeta: CanonicalMeta, tmdb: CanonicalMeta) -> CanonicalMeta {
        let title = if tmdb.title.is_empty() {
            cinemeta.title.clone()
        } else {
            tmdb.title.clone()
        };

        let mut alternate_titles = Vec::new();
        if !cinemeta.title.is_empty() && cinemeta.title != title {
            alternate_titles.push(cinemeta.title);
        }
        alternate_titles.extend(cinemeta.alternate_titles);
        alternate_titles.extend(tmdb.alternate_titles);

        CanonicalMeta {
            title,
            alternate_titles,
            year: tmdb.year.or(cinemeta.year),
        }
    }
}

#[async_trait]
impl MetadataProvider for LayeredMetadataProvider {
    async fn canonical_meta(
        &self,
        media_type: MediaType,
        canonical_id: &str,
    ) -> Result<CanonicalMeta, MetadataError> {
        let cinemeta = self.cinemeta.canonical_meta(media_type, canonical_id).await;

        let tmdb = match &self.tmdb {
            Some(client) => match client.canonical_meta(media_type, canonical_id).await {
                Ok(meta) => Some(meta),
                Err(e) => {
                    warn!(id = canonical_id, error = %e, "TMDB lookup failed");
                    None
                }
            },
            None => None,
        };

        match (cinemeta, tmdb) {
            (Ok(cin), Some(tm)) => Ok(Self::merge(cin, tm)),
            (Ok(cin), None) => Ok(cin),
            (Err(e), Some(tm)) => {
                debug!(id = canonical_id, error = %e, "Cinemeta failed, using TMDB result");
                Ok(tm)
            }
            (Err(e), None) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_tmdb_title_and_year() {
        let cinemeta = CanonicalMeta {
            title: "The Matrix".to_string(),
            alternate_titles: vec!["Matrix".to_string()],
            year: None,
        };
        let tmdb = CanonicalMeta {
            title: "Matrix".to_string(),
            alternate_titles: vec!["The Matrix".to_string()],
            year: Some(1999),
        };

        let merged = LayeredMetadataProvider::merge(cinemeta, tmdb);
        assert_eq!(merged.title, "Matrix");
        assert_eq!(merged.year, Some(1999));
        // Cinemeta title survives as an alternate
        assert!(merged.alternate_titles.contains(&"The Matrix".to_string()));
    }

    #[test]
    fn test_merge_falls_back_to_cinemeta_title() {
        let cinemeta = CanonicalMeta {
            title: "Pelíšky".to_string(),
            alternate_titles: vec![],
            year: Some(1999),
        };
        let tmdb = CanonicalMeta {
            title: String::new(),
            alternate_titles: vec![],
            year: None,
        };

        let merged = LayeredMetadataProvider::merge(cinemeta, tmdb);
        assert_eq!(merged.title, "Pelíšky");
        assert_eq!(merged.year, Some(1999));
    }
}
