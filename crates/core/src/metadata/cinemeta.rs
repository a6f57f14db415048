//! Cinemeta metadata client.
//!
//! Cinemeta serves canonical names, aliases, and release info for IMDb-style
//! identifiers. No API key required.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::resolver::MediaType;

use super::{CanonicalMeta, MetadataError, MetadataProvider};

/// Cinemeta API client.
pub struct CinemetaClient {
    client: Client,
    base_url: String,
}

impl CinemetaClient {
    /// Create a new Cinemeta client.
    pub fn new(base_url: String, timeout_secs: u32) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MetadataProvider for CinemetaClient {
    async fn canonical_meta(
        &self,
        media_type: MediaType,
        canonical_id: &str,
    ) -> Result<CanonicalMeta, MetadataError> {
        let url = format!(
            "{}/meta/{}/{}.json",
            self.base_url,
            media_type.as_str(),
            urlencoding::encode(canonical_id)
        );

        debug!(id = canonical_id, "Cinemeta lookup");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == 404 {
            return Err(MetadataError::NotFound(canonical_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body: CinemetaResponse = response.json().await.map_err(|e| {
            MetadataError::ParseError(format!("Failed to parse meta response: {}", e))
        })?;

        let meta = body.meta.ok_or_else(|| {
            MetadataError::ParseError("Response carries no meta object".to_string())
        })?;

        Ok(meta.into())
    }
}

// ============================================================================
// Cinemeta API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct CinemetaResponse {
    meta: Option<CinemetaMeta>,
}

#[derive(Debug, Deserialize)]
struct CinemetaMeta {
    name: Option<String>,
    #[serde(rename = "originalName")]
    original_name: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    /// Release info, e.g. "1999" or "2011-2019" for series runs.
    #[serde(rename = "releaseInfo")]
    release_info: Option<String>,
}

impl From<CinemetaMeta> for CanonicalMeta {
    fn from(m: CinemetaMeta) -> Self {
        let title = m.name.unwrap_or_default();

        let mut alternate_titles = Vec::new();
        if let Some(original) = m.original_name {
            if !original.is_empty() && original != title {
                alternate_titles.push(original);
            }
        }
        alternate_titles.extend(m.aliases.into_iter().filter(|a| !a.is_empty()));

        let year = m
            .release_info
            .as_deref()
            .and_then(|info| info.get(..4))
            .and_then(|y| y.parse::<u16>().ok());

        Self {
            title,
            alternate_titles,
            year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_conversion() {
        let meta = CinemetaMeta {
            name: Some("The Matrix".to_string()),
            original_name: Some("Matrix".to_string()),
            aliases: vec!["Матрица".to_string(), String::new()],
            release_info: Some("1999".to_string()),
        };

        let canonical: CanonicalMeta = meta.into();
        assert_eq!(canonical.title, "The Matrix");
        assert_eq!(canonical.alternate_titles, vec!["Matrix", "Матрица"]);
        assert_eq!(canonical.year, Some(1999));
    }

    #[test]
    fn test_meta_conversion_series_year_range() {
        let meta = CinemetaMeta {
            name: Some("Black Mirror".to_string()),
            original_name: None,
            aliases: vec![],
            release_info: Some("2011-2019".to_string()),
        };

        let canonical: CanonicalMeta = meta.into();
        assert_eq!(canonical.year, Some(2011));
    }

    #[test]
    fn test_meta_conversion_duplicate_original_name_skipped() {
        let meta = CinemetaMeta {
            name: Some("Dune".to_string()),
            original_name: Some("Dune".to_string()),
            aliases: vec![],
            release_info: None,
        };

        let canonical: CanonicalMeta = meta.into();
        assert!(canonical.alternate_titles.is_empty());
        assert_eq!(canonical.year, None);
    }

    #[test]
    fn test_response_parse() {
        let json = r#"{
            "meta": {
                "name": "Example Movie",
                "releaseInfo": "2020",
                "aliases": ["Another Name"]
            }
        }"#;
        let response: CinemetaResponse = serde_json::from_str(json).unwrap();
        let canonical: CanonicalMeta = response.meta.unwrap().into();
        assert_eq!(canonical.title, "Example Movie");
        assert_eq!(canonical.year, Some(2020));
        assert_eq!(canonical.alternate_titles, vec!["Another Name"]);
    }
}
