//! Immutable engine configuration.
//!
//! [`EngineConfig`] is constructed once at builder start and never mutated.
//! The regulator requires an identifying user-agent on every request and
//! caps clients at 10 requests per second; both are enforced here.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EngineError, Result};

/// Hard upper bound on the request rate (regulator policy).
pub const MAX_RATE_LIMIT_RPS: f64 = 10.0;

/// Engine configuration. Immutable after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Identifying user-agent, format `"Name/Version contact@example.com"`.
    pub user_agent: String,
    /// Directory for the on-disk HTTP response cache.
    pub cache_dir: PathBuf,
    /// Default output directory for written snapshots.
    pub output_dir: PathBuf,
    /// Number of tickers processed in parallel.
    pub max_concurrency: usize,
    /// Requests per second against the regulator (≤ 10).
    pub rate_limit_rps: f64,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl EngineConfig {
    /// Creates a configuration with the given user-agent and defaults for
    /// everything else.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidRequest`] if the user-agent is empty or
    /// not in `"Name/Version contact"` form (the regulator rejects those).
    pub fn new(user_agent: impl Into<String>) -> Result<Self> {
        let user_agent = user_agent.into();
        if user_agent.trim().is_empty() || !user_agent.contains(' ') {
            return Err(EngineError::InvalidRequest(
                "user_agent must be set and follow the format 'Name/Version contact'".into(),
            ));
        }
        Ok(Self {
            user_agent,
            cache_dir: PathBuf::from(".cache"),
            output_dir: PathBuf::from("out"),
            max_concurrency: 4,
            rate_limit_rps: MAX_RATE_LIMIT_RPS,
            http_timeout: Duration::from_secs(30),
        })
    }

    /// Sets the cache directory.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the cross-ticker concurrency (minimum 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = workers.max(1);
        self
    }

    /// Sets the request rate.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidRequest`] if `rps` is not positive or
    /// exceeds the regulator's 10 RPS ceiling.
    pub fn with_rate_limit(mut self, rps: f64) -> Result<Self> {
        if rps <= 0.0 || rps > MAX_RATE_LIMIT_RPS {
            return Err(EngineError::InvalidRequest(format!(
                "rate_limit_rps must be in (0, {MAX_RATE_LIMIT_RPS}], got {rps}"
            )));
        }
        self.rate_limit_rps = rps;
        Ok(self)
    }

    /// Sets the per-request HTTP timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}
