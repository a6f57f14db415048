//! Stremio addon endpoints.
//!
//! Implements the two routes an addon client calls: the manifest
//! describing what this addon serves, and the stream resource that
//! resolves a media id into playable stream entries. Stream responses
//! always answer 200 with a `streams` array; an id we cannot resolve
//! yields an empty array rather than an error status.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use pramen_core::{render_label, MediaType};

use crate::state::AppState;

/// Addon manifest served to Stremio clients.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resources: Vec<&'static str>,
    pub types: Vec<&'static str>,
    pub catalogs: Vec<serde_json::Value>,
}

/// One playable entry in a stream response.
#[derive(Debug, Serialize)]
pub struct StreamItem {
    pub title: String,
    pub url: String,
}

/// Body of a stream resource response.
#[derive(Debug, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<StreamItem>,
}

pub async fn manifest() -> Json<Manifest> {
    Json(Manifest {
        id: "community.pramen.czsk",
        version: env!("CARGO_PKG_VERSION"),
        name: "Pramen (CZ/SK)",
        description: "Filmy a seriály z Prehraj.to (CZ/SK)",
        resources: vec!["stream"],
        types: vec!["movie", "series"],
        catalogs: vec![],
    })
}

/// GET /stream/{media_type}/{id}
///
/// The final path segment arrives as "<media_id>.json". Unknown media
/// types and failed resolutions both answer with zero streams.
pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, String)>,
) -> Json<StreamsResponse> {
    let media_id = id.strip_suffix(".json").unwrap_or(&id);

    let media_type = match media_type.parse::<MediaType>() {
        Ok(media_type) => media_type,
        Err(e) => {
            debug!(media_id, "{}", e);
            return Json(StreamsResponse {
                streams: Vec::new(),
            });
        }
    };

    let resolution = state.resolver().resolve_id(media_type, media_id).await;
    let streams = resolution
        .streams
        .iter()
        .map(|stream| StreamItem {
            title: render_label(&resolution.request, stream),
            url: stream.playback_url.clone(),
        })
        .collect();

    Json(StreamsResponse { streams })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manifest_declares_stream_resource() {
        let Json(manifest) = manifest().await;
        assert_eq!(manifest.id, "community.pramen.czsk");
        assert_eq!(manifest.resources, vec!["stream"]);
        assert_eq!(manifest.types, vec!["movie", "series"]);
        assert!(manifest.catalogs.is_empty());
    }

    #[test]
    fn test_manifest_serializes_expected_keys() {
        let manifest = Manifest {
            id: "community.pramen.czsk",
            version: "0.1.0",
            name: "Pramen (CZ/SK)",
            description: "Filmy a seriály z Prehraj.to (CZ/SK)",
            resources: vec!["stream"],
            types: vec!["movie", "series"],
            catalogs: vec![],
        };
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["id"], "community.pramen.czsk");
        assert_eq!(json["resources"][0], "stream");
        assert_eq!(json["catalogs"], serde_json::json!([]));
    }

    #[test]
    fn test_stream_item_serializes_title_and_url_only() {
        let item = StreamItem {
            title: "The Matrix (1999)".to_string(),
            url: "https://cdn.example/matrix.mp4".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["title", "url"]);
    }
}
