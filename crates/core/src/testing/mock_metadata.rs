//! Mock metadata provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{CanonicalMeta, MetadataError, MetadataProvider};
use crate::resolver::MediaType;

/// Mock implementation of the [`MetadataProvider`] trait.
///
/// Metadata is routed by canonical id. Unknown ids return
/// [`MetadataError::NotFound`], and an injected error is consumed by
/// the next lookup regardless of id.
pub struct MockMetadataProvider {
    /// Routed metadata by canonical id.
    metas: Arc<RwLock<HashMap<String, CanonicalMeta>>>,
    /// One-shot error returned by the next lookup.
    next_error: Arc<RwLock<Option<MetadataError>>>,
    /// Recorded lookups in call order.
    lookups: Arc<RwLock<Vec<(MediaType, String)>>>,
}

impl std::fmt::Debug for MockMetadataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMetadataProvider").finish()
    }
}

impl Default for MockMetadataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetadataProvider {
    /// Create a new mock provider with no routed metadata.
    pub fn new() -> Self {
        Self {
            metas: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            lookups: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Route `canonical_id` to the given metadata.
    pub async fn set_meta(&self, canonical_id: &str, meta: CanonicalMeta) {
        self.metas
            .write()
            .await
            .insert(canonical_id.to_string(), meta);
    }

    /// Fail the next lookup with `error`, regardless of id.
    pub async fn set_error(&self, error: MetadataError) {
        *self.next_error.write().await = Some(error);
    }

    /// Lookups performed so far, in call order.
    pub async fn recorded_lookups(&self) -> Vec<(MediaType, String)> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn canonical_meta(
        &self,
        media_type: MediaType,
        canonical_id: &str,
    ) -> Result<CanonicalMeta, MetadataError> {
        self.lookups
            .write()
            .await
            .push((media_type, canonical_id.to_string()));

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        match self.metas.read().await.get(canonical_id) {
            Some(meta) => Ok(meta.clone()),
            None => Err(MetadataError::NotFound(canonical_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_meta(title: &str) -> CanonicalMeta {
        CanonicalMeta {
            title: title.to_string(),
            alternate_titles: Vec::new(),
            year: Some(1999),
        }
    }

    #[tokio::test]
    async fn test_routed_meta_is_served() {
        let provider = MockMetadataProvider::new();
        provider.set_meta("tt0133093", make_meta("The Matrix")).await;

        let meta = provider
            .canonical_meta(MediaType::Movie, "tt0133093")
            .await
            .unwrap();
        assert_eq!(meta.title, "The Matrix");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let provider = MockMetadataProvider::new();
        let err = provider
            .canonical_meta(MediaType::Movie, "tt0000000")
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_injected_error_is_consumed() {
        let provider = MockMetadataProvider::new();
        provider.set_meta("tt0133093", make_meta("The Matrix")).await;
        provider.set_error(MetadataError::RateLimitExceeded).await;

        assert!(provider
            .canonical_meta(MediaType::Movie, "tt0133093")
            .await
            .is_err());
        assert!(provider
            .canonical_meta(MediaType::Movie, "tt0133093")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_lookups_are_recorded() {
        let provider = MockMetadataProvider::new();
        let _ = provider.canonical_meta(MediaType::Movie, "tt1").await;
        let _ = provider.canonical_meta(MediaType::Series, "tt2").await;

        let lookups = provider.recorded_lookups().await;
        assert_eq!(lookups.len(), 2);
        assert_eq!(lookups[0], (MediaType::Movie, "tt1".to_string()));
        assert_eq!(lookups[1], (MediaType::Series, "tt2".to_string()));
    }
}
