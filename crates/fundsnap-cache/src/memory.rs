//! In-memory cache implementation.

use async_trait::async_trait;
use fundsnap_core::cache::{CachedResponse, HttpCache};
use fundsnap_core::error::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory cache for testing and development.
///
/// Entries are stored in an `RwLock`-protected `HashMap` and lost when the
/// cache is dropped. Responses are cloned on get/put.
#[derive(Debug, Default)]
pub struct InMemoryHttpCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl InMemoryHttpCache {
    /// Creates a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl HttpCache for InMemoryHttpCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => {
                debug!("cache hit");
                Ok(Some(entry.clone()))
            }
            None => {
                debug!("cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, response), fields(key = %key, bytes = response.body.len()))]
    async fn put(&self, key: &str, response: &CachedResponse) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), response.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
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
            etag: None,
            body: body.to_vec(),
            fetched_at: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn roundtrip() {
        let cache = InMemoryHttpCache::new();
        assert!(cache.is_empty().await);

        cache.put("key", &response(b"body")).await.unwrap();
        assert_eq!(cache.len().await, 1);

        let hit = cache.get("key").await.unwrap().unwrap();
        assert_eq!(hit.body, b"body");
        assert!(cache.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_entries() {
        let cache = InMemoryHttpCache::new();
        cache.put("key", &response(b"body")).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get("key").await.unwrap().is_none());
    }
}
