#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fundsnap/fundsnap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR ingestion for point-in-time snapshots.
//!
//! The pieces compose in dependency order:
//!
//! - [`RateLimiter`](limiter::RateLimiter) - token bucket, shared across workers
//! - [`EdgarClient`](client::EdgarClient) - cached, rate-limited, retrying HTTP
//! - [`CikMap`](cik::CikMap) - ticker → issuer identifier registry
//! - [`FilingsIndex`](filings::FilingsIndex) - per-issuer filings with the PIT gate
//! - [`FactStore`](facts::FactStore) - parsed company-facts XBRL streams
//! - [`contexts`] - best-fact selection for a fiscal period under a cutoff
//! - [`mapper`] - ordered GAAP tag priority lists per standard field
//! - [`StatementAssembler`](assemble::StatementAssembler) - typed statement rows

/// Statement row assembly from resolved facts.
pub mod assemble;
/// Ticker → CIK resolution.
pub mod cik;
/// Cached, rate-limited HTTP client for EDGAR endpoints.
pub mod client;
/// Fact selection for a target fiscal period under a cutoff.
pub mod contexts;
/// Company-facts fetching and parsing.
pub mod facts;
/// Per-issuer filings index with point-in-time filtering.
pub mod filings;
/// Token bucket rate limiter.
pub mod limiter;
/// GAAP tag → standard field mapping.
pub mod mapper;

pub use assemble::StatementAssembler;
pub use cik::CikMap;
pub use client::EdgarClient;
pub use facts::{FactStore, fetch_company_facts};
pub use filings::FilingsIndex;
pub use limiter::RateLimiter;
pub use mapper::{TAG_PRIORITY_MAP, TagMapping, mapping_for, resolve_field};

/// Base URL for the EDGAR data API.
pub const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// URL of the regulator-published ticker → CIK registry.
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";
