#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fundsnap/fundsnap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for the snapshot engine.
//!
//! This crate provides implementations of the [`HttpCache`] trait from
//! `fundsnap-core`:
//!
//! - [`SqliteHttpCache`] - persistent on-disk cache (default, requires the `sqlite` feature)
//! - [`InMemoryHttpCache`] - in-memory cache for testing
//! - [`NoopHttpCache`] - no-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

/// SQLite-based cache implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use fundsnap_core::cache::HttpCache;

// Re-export implementations
pub use memory::InMemoryHttpCache;
pub use noop::NoopHttpCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteHttpCache;
