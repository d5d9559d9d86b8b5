//! Error types for snapshot operations.
//!
//! This module defines [`EngineError`] which covers all error cases that can
//! occur while fetching, parsing, or assembling point-in-time snapshots.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Errors that can occur during snapshot operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A row or filing slipped past the point-in-time gate.
    ///
    /// This signals a programming error in the filter chain, never an
    /// expected runtime condition. The snapshot build is aborted.
    #[error(
        "cutoff violation: filing {accession} for {ticker} accepted at \
         {acceptance_datetime} which is after cutoff {cutoff}"
    )]
    CutoffViolation {
        /// Ticker whose filing violated the gate.
        ticker: String,
        /// Accession number of the offending filing.
        accession: String,
        /// The acceptance timestamp that caused the violation.
        acceptance_datetime: NaiveDateTime,
        /// The cutoff date that was in effect.
        cutoff: NaiveDate,
    },

    /// User-agent missing or rejected by the regulator (HTTP 403).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Transport failure or 5xx after retries were exhausted.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint returned 404; no data exists for this entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed payload from the regulator.
    #[error("parse error: {0}")]
    Parse(String),

    /// Error interacting with the response cache.
    #[error("cache error: {0}")]
    Cache(String),

    /// A ticker could not be resolved to an issuer identifier.
    #[error("ticker not found in issuer registry: {0}")]
    TickerNotFound(String),

    /// Invalid request or configuration parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Filesystem error while writing snapshot output.
    #[error("io error: {0}")]
    Io(String),
}

impl EngineError {
    /// Returns true if this error is isolated to a single ticker.
    ///
    /// Per-ticker errors are recorded in the coverage report and the
    /// remaining tickers continue; anything else aborts the snapshot.
    #[must_use]
    pub const fn is_per_ticker(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::NotFound(_) | Self::Parse(_) | Self::TickerNotFound(_)
        )
    }
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_ticker_classification() {
        assert!(EngineError::Network("timeout".into()).is_per_ticker());
        assert!(EngineError::NotFound("CIK0000000001".into()).is_per_ticker());
        assert!(EngineError::Parse("bad json".into()).is_per_ticker());
        assert!(!EngineError::Auth("missing user-agent".into()).is_per_ticker());
        assert!(!EngineError::CutoffViolation {
            ticker: "AAPL".into(),
            accession: "0000320193-17-000009".into(),
            acceptance_datetime: NaiveDate::from_ymd_opt(2017, 2, 15)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            cutoff: NaiveDate::from_ymd_opt(2016, 12, 31).unwrap(),
        }
        .is_per_ticker());
    }
}
