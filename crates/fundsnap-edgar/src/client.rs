//! Cached, rate-limited HTTP client for EDGAR endpoints.
//!
//! Every request runs the same pipeline: consult the cache, acquire one
//! rate-limit token on a miss, issue the GET with the mandatory user-agent,
//! retry transient failures with exponential backoff, and store successful
//! bodies back into the cache.

use chrono::Utc;
use rand::Rng;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use fundsnap_core::cache::{CachedResponse, HttpCache};
use fundsnap_core::config::EngineConfig;
use fundsnap_core::error::{EngineError, Result};

use crate::limiter::RateLimiter;

/// Maximum number of attempts per request (first try + retries).
const MAX_ATTEMPTS: u32 = 5;

/// Initial retry delay; doubles per attempt.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Ceiling on any single retry delay.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Upper bound of the random jitter added to each retry delay.
const JITTER_MS: u64 = 250;

/// HTTP client for the regulator's endpoints.
///
/// Owns the rate limiter and response cache; clone the `Arc`s it is built
/// from to share those across components. The user-agent is baked into the
/// underlying `reqwest::Client` and sent on every request.
#[derive(Clone)]
pub struct EdgarClient {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    cache: Arc<dyn HttpCache>,
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient")
            .field("rate_limit_rps", &self.limiter.rate())
            .finish()
    }
}

impl EdgarClient {
    /// Builds a client from the engine configuration and a response cache.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidRequest`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &EngineConfig, cache: Arc<dyn HttpCache>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| EngineError::InvalidRequest(format!("http client: {e}")))?;

        Ok(Self {
            http,
            limiter: Arc::new(RateLimiter::new(config.rate_limit_rps)),
            cache,
        })
    }

    /// The shared rate limiter (for diagnostics).
    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Canonicalizes a URL into a cache key.
    ///
    /// Lowercases scheme and host, drops default ports and fragments. The
    /// user-agent never participates in the key.
    pub fn cache_key(url: &str) -> Result<String> {
        let mut parsed =
            Url::parse(url).map_err(|e| EngineError::InvalidRequest(format!("bad url {url}: {e}")))?;
        parsed.set_fragment(None);
        Ok(parsed.to_string())
    }

    /// Fetches raw bytes, going through cache, rate limiter, and retries.
    ///
    /// # Errors
    /// - [`EngineError::Auth`] on HTTP 403 (user-agent rejected)
    /// - [`EngineError::NotFound`] on HTTP 404
    /// - [`EngineError::Network`] on other 4xx, or 5xx/transport failures
    ///   after retries are exhausted
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let key = Self::cache_key(url)?;

        if let Some(hit) = self.cache.get(&key).await? {
            debug!(url, "cache hit");
            return Ok(hit.body);
        }

        let mut delay = BASE_DELAY;
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            self.limiter.acquire().await;
            debug!(url, attempt, "GET");

            match self.http.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let etag = response
                            .headers()
                            .get(reqwest::header::ETAG)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        let body = response
                            .bytes()
                            .await
                            .map_err(|e| EngineError::Network(e.to_string()))?
                            .to_vec();

                        let cached = CachedResponse {
                            status: status.as_u16(),
                            etag,
                            body: body.clone(),
                            fetched_at: Utc::now().naive_utc(),
                        };
                        self.cache.put(&key, &cached).await?;
                        return Ok(body);
                    }

                    match status {
                        StatusCode::FORBIDDEN => {
                            return Err(EngineError::Auth(format!(
                                "user-agent rejected (HTTP 403) for {url}"
                            )));
                        }
                        StatusCode::NOT_FOUND => {
                            return Err(EngineError::NotFound(url.to_string()));
                        }
                        StatusCode::TOO_MANY_REQUESTS => {
                            last_error = format!("HTTP 429 for {url}");
                        }
                        s if s.is_server_error() => {
                            last_error = format!("HTTP {s} for {url}");
                        }
                        s => {
                            // Remaining 4xx: the request itself is wrong, retrying won't help
                            return Err(EngineError::Network(format!("HTTP {s} for {url}")));
                        }
                    }
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            if attempt < MAX_ATTEMPTS {
                let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=JITTER_MS));
                let wait = delay.min(MAX_DELAY) + jitter;
                warn!(url, attempt, error = %last_error, ?wait, "retrying after transient failure");
                sleep(wait).await;
                delay = delay.saturating_mul(2);
            }
        }

        Err(EngineError::Network(format!(
            "{MAX_ATTEMPTS} attempts exhausted for {url}: {last_error}"
        )))
    }

    /// Fetches and deserializes a JSON endpoint.
    ///
    /// # Errors
    /// As [`get_bytes`](Self::get_bytes), plus [`EngineError::Parse`] when
    /// the body is not valid JSON for `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| EngineError::Parse(format!("invalid JSON from {url}: {e}")))
    }
}
