//! Mock page fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetch::{FetchError, FetchedPage, PageFetcher};

/// Mock implementation of the [`PageFetcher`] trait.
///
/// Pages are routed by exact target string. Unrouted targets fail the
/// way an unreachable index would, and injected errors are consumed on
/// first use so retry behavior can be exercised.
///
/// # Example
///
/// ```rust,ignore
/// use pramen_core::testing::MockPageFetcher;
///
/// let fetcher = MockPageFetcher::new();
/// fetcher.set_page("/hledej/matrix", "<html>...</html>").await;
///
/// let page = fetcher.fetch_page("/hledej/matrix").await?;
/// assert_eq!(fetcher.fetch_count().await, 1);
/// ```
pub struct MockPageFetcher {
    /// Routed pages by target.
    pages: Arc<RwLock<HashMap<String, String>>>,
    /// One-shot errors by target.
    errors: Arc<RwLock<HashMap<String, FetchError>>>,
    /// Recorded fetch targets in call order.
    fetches: Arc<RwLock<Vec<String>>>,
    /// Mirror reported as page provenance.
    mirror: String,
}

impl std::fmt::Debug for MockPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPageFetcher")
            .field("mirror", &self.mirror)
            .finish()
    }
}

impl Default for MockPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPageFetcher {
    /// Create a new mock fetcher with no routed pages.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            mirror: "https://index.mock".to_string(),
        }
    }

    /// The mirror this mock reports as provenance.
    pub fn mirror(&self) -> &str {
        &self.mirror
    }

    /// Route `target` to a page body.
    pub async fn set_page(&self, target: &str, body: &str) {
        self.pages
            .write()
            .await
            .insert(target.to_string(), body.to_string());
    }

    /// Fail the next fetch of `target` with `error`. The error is
    /// consumed on use; later fetches fall back to routed pages.
    pub async fn set_error(&self, target: &str, error: FetchError) {
        self.errors.write().await.insert(target.to_string(), error);
    }

    /// Targets fetched so far, in call order.
    pub async fn recorded_fetches(&self) -> Vec<String> {
        self.fetches.read().await.clone()
    }

    /// Number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch_page(&self, target: &str) -> Result<FetchedPage, FetchError> {
        self.fetches.write().await.push(target.to_string());

        if let Some(error) = self.errors.write().await.remove(target) {
            return Err(error);
        }

        match self.pages.read().await.get(target) {
            Some(body) => Ok(FetchedPage {
                body: body.clone(),
                mirror: self.mirror.clone(),
            }),
            None => Err(FetchError::HttpStatus {
                status: 404,
                url: format!("{}{}", self.mirror, target),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_routed_page_is_served() {
        let fetcher = MockPageFetcher::new();
        fetcher.set_page("/hledej/matrix", "<html>results</html>").await;

        let page = fetcher.fetch_page("/hledej/matrix").await.unwrap();
        assert_eq!(page.body, "<html>results</html>");
        assert_eq!(page.mirror, "https://index.mock");
    }

    #[tokio::test]
    async fn test_unrouted_target_fails() {
        let fetcher = MockPageFetcher::new();
        let err = fetcher.fetch_page("/missing").await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_injected_error_is_consumed() {
        let fetcher = MockPageFetcher::new();
        fetcher.set_page("/flaky", "recovered").await;
        fetcher.set_error("/flaky", FetchError::Timeout).await;

        assert!(fetcher.fetch_page("/flaky").await.is_err());
        let page = fetcher.fetch_page("/flaky").await.unwrap();
        assert_eq!(page.body, "recovered");
    }

    #[tokio::test]
    async fn test_fetches_are_recorded_in_order() {
        let fetcher = MockPageFetcher::new();
        let _ = fetcher.fetch_page("/first").await;
        let _ = fetcher.fetch_page("/second").await;

        assert_eq!(
            fetcher.recorded_fetches().await,
            vec!["/first".to_string(), "/second".to_string()]
        );
        assert_eq!(fetcher.fetch_count().await, 2);
    }
}
