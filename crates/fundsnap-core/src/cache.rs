//! HTTP response cache trait and types.
//!
//! Historical regulator data is immutable, so successful responses are
//! cached indefinitely. Failures are never stored. Implementations live in
//! the `fundsnap-cache` crate (sqlite, in-memory, no-op).

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A cached HTTP response body with metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status code (always 2xx; failures are not cached).
    pub status: u16,
    /// ETag header, when the server sent one.
    pub etag: Option<String>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// When the response was fetched.
    pub fetched_at: NaiveDateTime,
}

impl CachedResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Trait for caching HTTP responses.
///
/// Keys are canonicalized request URLs; the user-agent never participates in
/// the key. Concurrent writers of the same key are tolerated (last write
/// wins; the bodies are equivalent for immutable history).
#[async_trait]
pub trait HttpCache: Send + Sync {
    /// Retrieves a cached response, or `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>>;

    /// Stores a response. Callers must only store successful responses.
    async fn put(&self, key: &str, response: &CachedResponse) -> Result<()>;

    /// Removes all cached entries.
    async fn clear(&self) -> Result<()>;
}
