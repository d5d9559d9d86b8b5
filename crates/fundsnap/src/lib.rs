#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fundsnap/fundsnap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Point-in-time fundamental snapshot engine.
//!
//! This crate ties the workspace together:
//!
//! - [`SnapshotBuilder`] - concurrent build orchestration
//! - [`selector`] - best-filing-per-period selection with the cutoff assertion
//! - [`coverage`] - the authoritative failure surface
//! - [`validation`] - accounting identity checks and the final PIT assertion
//! - [`output`] - Parquet/CSV table writers
//!
//! Core types, cache implementations, and the EDGAR provider are re-exported
//! from their crates.

/// Snapshot build orchestration.
pub mod builder;
/// Coverage report construction.
pub mod coverage;
/// Snapshot serialization to columnar files.
pub mod output;
/// Best-filing selection per fiscal period.
pub mod selector;
/// Accounting identity checks and the emission-time PIT assertion.
pub mod validation;

// Core types and traits
pub use fundsnap_core::*;

// Cache implementations
pub use fundsnap_cache::{InMemoryHttpCache, NoopHttpCache, SqliteHttpCache};

// EDGAR provider pieces
pub use fundsnap_edgar::{
    CikMap, EdgarClient, FactStore, FilingsIndex, RateLimiter, StatementAssembler,
};

pub use builder::SnapshotBuilder;
pub use coverage::build_coverage;
pub use output::{OutputFormat, write_snapshot};
pub use selector::select_filings;
