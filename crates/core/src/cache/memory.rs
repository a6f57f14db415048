//! In-process result cache.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CacheError, ResultCache};

struct Entry {
    value: String,
    stored_at: DateTime<Utc>,
}

/// HashMap-backed cache with lazy expiry. The default backend.
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(entry.stored_at);
        age.num_milliseconds() > self.ttl.as_millis() as i64
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !self.is_expired(entry, now) => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {} // expired, fall through to removal
                None => return Ok(None),
            }
        }

        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("search:q", "[]").await.unwrap();
        assert_eq!(cache.get("search:q").await.unwrap(), Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        assert!(cache.get("search:missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_is_last_writer_wins() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", "first").await.unwrap();
        cache.set("k", "second").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new(Duration::from_millis(10));
        cache.set("k", "v").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new(Duration::from_millis(10));
        cache.set("old", "v").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.set("fresh", "v").await.unwrap();

        let removed = cache.purge_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get("fresh").await.unwrap().is_some());
    }
}
