//! SQLite-backed result cache.
//!
//! Survives restarts, which matters for the search listing cache when the
//! upstream index is slow or rate-limits aggressively.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{CacheError, ResultCache};

/// SQLite-backed result cache.
pub struct SqliteCache {
    conn: Mutex<Connection>,
    ttl: Duration,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path`.
    pub fn new(path: &Path, ttl: Duration) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            ttl,
        })
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory(ttl: Duration) -> Result<Self, CacheError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            ttl,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS result_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_result_cache_stored_at ON result_cache(stored_at);
            "#,
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }

    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now() - chrono::Duration::milliseconds(self.ttl.as_millis() as i64)
    }
}

#[async_trait]
impl ResultCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT value, stored_at FROM result_cache WHERE key = ?",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CacheError::Database(e.to_string())),
            })?;

        let Some((value, stored_at_str)) = row else {
            return Ok(None);
        };

        let stored_at = DateTime::parse_from_rfc3339(&stored_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        if stored_at < self.cutoff() {
            conn.execute("DELETE FROM result_cache WHERE key = ?", params![key])
                .map_err(|e| CacheError::Database(e.to_string()))?;
            return Ok(None);
        }

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO result_cache (key, value, stored_at) VALUES (?, ?, ?)",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute(
                "DELETE FROM result_cache WHERE stored_at < ?",
                params![self.cutoff().to_rfc3339()],
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_cache(ttl: Duration) -> SqliteCache {
        SqliteCache::in_memory(ttl).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = create_test_cache(Duration::from_secs(60));
        cache.set("stream:/video/x", "https://cdn/v.mp4").await.unwrap();
        assert_eq!(
            cache.get("stream:/video/x").await.unwrap(),
            Some("https://cdn/v.mp4".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = create_test_cache(Duration::from_secs(60));
        assert!(cache.get("search:missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_existing_key() {
        let cache = create_test_cache(Duration::from_secs(60));
        cache.set("k", "first").await.unwrap();
        cache.set("k", "second").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = create_test_cache(Duration::from_millis(10));
        cache.set("k", "v").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = create_test_cache(Duration::from_millis(10));
        cache.set("old-a", "v").await.unwrap();
        cache.set("old-b", "v").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.set("fresh", "v").await.unwrap();

        let removed = cache.purge_expired().await.unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        {
            let cache = SqliteCache::new(&path, Duration::from_secs(60)).unwrap();
            cache.set("search:q", "[]").await.unwrap();
        }

        let cache = SqliteCache::new(&path, Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("search:q").await.unwrap(), Some("[]".to_string()));
    }
}
