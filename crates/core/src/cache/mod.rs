//! Result cache.
//!
//! Memoizes two request-independent facts for a bounded time window: the
//! parsed listing for a search query (`search:<query>`) and the extracted
//! playback URL for a detail page (`stream:<detail-url>`). Values are plain
//! strings; callers serialize structured values as JSON. Writes are
//! last-writer-wins, which is safe because cached content is immutable for
//! the TTL window.

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur in the result cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Cache key for a search query's parsed listing.
pub fn search_key(query: &str) -> String {
    format!("search:{}", query)
}

/// Cache key for a detail page's extracted playback URL.
pub fn stream_key(detail_url: &str) -> String {
    format!("stream:{}", detail_url)
}

/// Get/set-with-expiry contract shared by the search client and the stream
/// extractor.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Return the value for `key` if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, resetting its TTL window.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Drop expired entries, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, CacheError>;
}

/// Cache that stores nothing. Used when caching is disabled and in tests
/// that must observe every upstream call.
pub struct NoopCache;

#[async_trait]
impl ResultCache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_namespaces_are_disjoint() {
        assert_eq!(search_key("matrix 1999"), "search:matrix 1999");
        assert_eq!(stream_key("/video/abc"), "stream:/video/abc");
        assert_ne!(search_key("x"), stream_key("x"));
    }

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache;
        cache.set("search:q", "value").await.unwrap();
        assert!(cache.get("search:q").await.unwrap().is_none());
        assert_eq!(cache.purge_expired().await.unwrap(), 0);
    }
}
