//! TMDB (The Movie Database) metadata client.
//!
//! Looks up movies and series by external IMDb identifier via the `/find`
//! endpoint. Requires an API key; rate limits are generous.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::resolver::MediaType;

use super::{CanonicalMeta, MetadataError, MetadataProvider};

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig, timeout_secs: u32) -> Result<Self, MetadataError> {
        if config.api_key.is_empty() {
            return Err(MetadataError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn canonical_meta(
        &self,
        media_type: MediaType,
        canonical_id: &str,
    ) -> Result<CanonicalMeta, MetadataError> {
        // Strip the episode locator from series identifiers before the lookup.
        let imdb_id = canonical_id.split(':').next().unwrap_or(canonical_id);

        let url = format!("{}/find/{}", self.base_url, urlencoding::encode(imdb_id));

        debug!(id = imdb_id, "TMDB find lookup");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("external_source", "imdb_id"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(MetadataError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(MetadataError::RateLimitExceeded);
        }
        if status == 404 {
            return Err(MetadataError::NotFound(imdb_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let found: TmdbFindResponse = response.json().await.map_err(|e| {
            MetadataError::ParseError(format!("Failed to parse find response: {}", e))
        })?;

        match media_type {
            MediaType::Movie => found
                .movie_results
                .into_iter()
                .next()
                .map(CanonicalMeta::from)
                .ok_or_else(|| MetadataError::NotFound(imdb_id.to_string())),
            MediaType::Series => found
                .tv_results
                .into_iter()
                .next()
                .map(CanonicalMeta::from)
                .ok_or_else(|| MetadataError::NotFound(imdb_id.to_string())),
        }
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbFindResponse {
    #[serde(default)]
    movie_results: Vec<TmdbFindMovie>,
    #[serde(default)]
    tv_results: Vec<TmdbFindTv>,
}

#[derive(Debug, Deserialize)]
struct TmdbFindMovie {
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbFindTv {
    name: String,
    original_name: Option<String>,
    first_air_date: Option<String>,
}

fn year_of(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

impl From<TmdbFindMovie> for CanonicalMeta {
    fn from(m: TmdbFindMovie) -> Self {
        let mut alternate_titles = Vec::new();
        if let Some(original) = m.original_title {
            if !original.is_empty() && original != m.title {
                alternate_titles.push(original);
            }
        }
        Self {
            year: year_of(m.release_date.as_deref()),
            title: m.title,
            alternate_titles,
        }
    }
}

impl From<TmdbFindTv> for CanonicalMeta {
    fn from(t: TmdbFindTv) -> Self {
        let mut alternate_titles = Vec::new();
        if let Some(original) = t.original_name {
            if !original.is_empty() && original != t.name {
                alternate_titles.push(original);
            }
        }
        Self {
            year: year_of(t.first_air_date.as_deref()),
            title: t.name,
            alternate_titles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TmdbConfig;

    #[test]
    fn test_new_requires_api_key() {
        let config = TmdbConfig {
            api_key: String::new(),
            base_url: "https://api.themoviedb.org/3".to_string(),
        };
        let result = TmdbClient::new(config, 12);
        assert!(matches!(result, Err(MetadataError::NotConfigured(_))));
    }

    #[test]
    fn test_find_movie_conversion() {
        let movie = TmdbFindMovie {
            title: "Pelíšky".to_string(),
            original_title: Some("Pelíšky".to_string()),
            release_date: Some("1999-04-08".to_string()),
        };

        let canonical: CanonicalMeta = movie.into();
        assert_eq!(canonical.title, "Pelíšky");
        assert!(canonical.alternate_titles.is_empty());
        assert_eq!(canonical.year, Some(1999));
    }

    #[test]
    fn test_find_tv_conversion_keeps_original_name() {
        let tv = TmdbFindTv {
            name: "Money Heist".to_string(),
            original_name: Some("La casa de papel".to_string()),
            first_air_date: Some("2017-05-02".to_string()),
        };

        let canonical: CanonicalMeta = tv.into();
        assert_eq!(canonical.title, "Money Heist");
        assert_eq!(canonical.alternate_titles, vec!["La casa de papel"]);
        assert_eq!(canonical.year, Some(2017));
    }

    #[test]
    fn test_find_response_parse() {
        let json = r#"{
            "movie_results": [
                {"title": "Example Movie", "original_title": "Príklad", "release_date": "2020-01-01"}
            ],
            "tv_results": []
        }"#;
        let response: TmdbFindResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.movie_results.len(), 1);
        let canonical: CanonicalMeta = response.movie_results.into_iter().next().unwrap().into();
        assert_eq!(canonical.alternate_titles, vec!["Príklad"]);
    }
}
