//! Reporting period definitions.
//!
//! This module defines [`PeriodType`] for the requested reporting cadence
//! and [`PeriodKind`] for the temporal shape of an XBRL fact.

use serde::{Deserialize, Serialize};

/// Reporting cadence for fundamental data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodType {
    /// Annual reporting period.
    #[default]
    Annual,
    /// Quarterly reporting period.
    Quarterly,
}

impl PeriodType {
    /// Returns the short code used in table keys and logs ("A" or "Q").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Annual => "A",
            Self::Quarterly => "Q",
        }
    }
}

/// Temporal shape of an XBRL fact.
///
/// Flow items (income, cash flow) span a duration; stock items (balance
/// sheet) are measured at an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    /// A point-in-time measurement (balance sheet items).
    Instant,
    /// A measurement over a start..end window (income and cash flow items).
    Duration,
}
