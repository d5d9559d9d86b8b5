//! SQLite-based cache implementation.

use async_trait::async_trait;
use fundsnap_core::cache::{CachedResponse, HttpCache};
use fundsnap_core::dates::parse_datetime;
use fundsnap_core::error::{EngineError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// SQLite-backed HTTP response cache.
///
/// Stores response bodies in a database file, providing persistence across
/// process invocations. Successful entries never expire: the regulator's
/// historical data is immutable. `INSERT OR REPLACE` makes concurrent
/// writers of the same key safe (last write wins; the values are
/// equivalent).
#[derive(Debug)]
pub struct SqliteHttpCache {
    conn: Mutex<Connection>,
}

impl SqliteHttpCache {
    /// Opens (or creates) a cache at the given path.
    ///
    /// Parent directories are created if missing.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation
    /// fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::Cache(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| EngineError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Creates an in-memory cache. Useful for testing; data is lost when the
    /// cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| EngineError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS http_cache (
                key TEXT PRIMARY KEY,
                status INTEGER NOT NULL,
                etag TEXT,
                body BLOB NOT NULL,
                fetched_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| EngineError::Cache(e.to_string()))?;

        debug!("sqlite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl HttpCache for SqliteHttpCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Cache(e.to_string()))?;

        let row = conn
            .query_row(
                "SELECT status, etag, body, fetched_at FROM http_cache WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| EngineError::Cache(e.to_string()))?;

        match row {
            Some((status, etag, body, fetched_at)) => {
                let fetched_at = parse_datetime(&fetched_at).ok_or_else(|| {
                    EngineError::Cache(format!("corrupt fetched_at timestamp: {fetched_at}"))
                })?;
                debug!("cache hit ({} bytes)", body.len());
                Ok(Some(CachedResponse {
                    status,
                    etag,
                    body,
                    fetched_at,
                }))
            }
            None => {
                debug!("cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, response), fields(key = %key, bytes = response.body.len()))]
    async fn put(&self, key: &str, response: &CachedResponse) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO http_cache (key, status, etag, body, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                key,
                response.status,
                response.etag,
                response.body,
                response.fetched_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ],
        )
        .map_err(|e| EngineError::Cache(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Cache(e.to_string()))?;
        conn.execute("DELETE FROM http_cache", [])
            .map_err(|e| EngineError::Cache(e.to_string()))?;
        debug!("cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn response(body: &[u8]) -> CachedResponse {
        CachedResponse {
            status: 200,
            etag: Some("\"abc123\"".to_string()),
            body: body.to_vec(),
            fetched_at: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn roundtrip() {
        let cache = SqliteHttpCache::in_memory().unwrap();
        let key = "https://data.sec.gov/submissions/CIK0000320193.json";

        assert!(cache.get(key).await.unwrap().is_none());

        let stored = response(b"{\"filings\":{}}");
        cache.put(key, &stored).await.unwrap();

        let hit = cache.get(key).await.unwrap().unwrap();
        assert_eq!(hit, stored);
        assert!(hit.is_success());
    }

    #[tokio::test]
    async fn replace_is_last_write_wins() {
        let cache = SqliteHttpCache::in_memory().unwrap();
        let key = "https://data.sec.gov/submissions/CIK0000320193.json";

        cache.put(key, &response(b"first")).await.unwrap();
        cache.put(key, &response(b"second")).await.unwrap();

        let hit = cache.get(key).await.unwrap().unwrap();
        assert_eq!(hit.body, b"second");
    }

    #[tokio::test]
    async fn clear_removes_entries() {
        let cache = SqliteHttpCache::in_memory().unwrap();
        cache.put("k1", &response(b"a")).await.unwrap();
        cache.put("k2", &response(b"b")).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get("k1").await.unwrap().is_none());
        assert!(cache.get("k2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("http_cache.db");

        {
            let cache = SqliteHttpCache::new(&path).unwrap();
            cache.put("key", &response(b"persisted")).await.unwrap();
        }

        let cache = SqliteHttpCache::new(&path).unwrap();
        let hit = cache.get("key").await.unwrap().unwrap();
        assert_eq!(hit.body, b"persisted");
    }
}
