//! No-op cache implementation.

use async_trait::async_trait;
use fundsnap_core::cache::{CachedResponse, HttpCache};
use fundsnap_core::error::Result;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// All `get` calls return `Ok(None)` and `put`/`clear` succeed without
/// effect. Useful for disabling caching or exercising cache-miss paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpCache;

impl NoopHttpCache {
    /// Creates a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpCache for NoopHttpCache {
    async fn get(&self, _key: &str) -> Result<Option<CachedResponse>> {
        trace!("NoopHttpCache: get called, returning None");
        Ok(None)
    }

    async fn put(&self, _key: &str, _response: &CachedResponse) -> Result<()> {
        trace!("NoopHttpCache: put called, doing nothing");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopHttpCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn get_always_misses() {
        let cache = NoopHttpCache::new();
        let response = CachedResponse {
            status: 200,
            etag: None,
            body: b"body".to_vec(),
            fetched_at: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        };

        cache.put("key", &response).await.unwrap();
        assert!(cache.get("key").await.unwrap().is_none());
        assert!(cache.clear().await.is_ok());
    }
}
