#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fundsnap/fundsnap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for point-in-time fundamental snapshots.
//!
//! This crate provides the foundational abstractions shared by the rest of
//! the workspace:
//!
//! - [`Ticker`](types::Ticker), [`Cik`](types::Cik) - identifiers
//! - [`Filing`](types::Filing), [`XbrlFact`](types::XbrlFact) - regulatory filing data
//! - [`StandardField`](field::StandardField) - the closed set of statement line items
//! - [`SnapshotRequest`](types::SnapshotRequest) / [`SnapshotResult`](types::SnapshotResult)
//! - [`HttpCache`](cache::HttpCache) - response caching abstraction
//! - [`dates`] - the cutoff comparisons every component must route through

/// HTTP response cache trait and types.
pub mod cache;
/// Immutable engine configuration.
pub mod config;
/// Point-in-time date logic and parsing helpers.
pub mod dates;
/// Error types for snapshot operations.
pub mod error;
/// Standard statement field enumeration.
pub mod field;
/// Reporting period definitions.
pub mod period;
/// Core data types (Ticker, Cik, Filing, XbrlFact, rows, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{CachedResponse, HttpCache};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use field::{StandardField, StatementType};
pub use period::{PeriodKind, PeriodType};
pub use types::{
    BalanceRow, CashflowRow, Cik, CompanyRow, CoverageReport, DerivedRow, Filing, FilingRow,
    FormType, IncomeRow, IssueKind, SnapshotRequest, SnapshotResult, SnapshotTables, TableRow,
    Ticker, TickerIssue, XbrlFact,
};
