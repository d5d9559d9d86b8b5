//! Ticker → CIK resolution using the regulator's company tickers registry.
//!
//! The registry is a single JSON document (~2MB) covering current and
//! historically delisted issuers. It is downloaded once per builder run and
//! shared read-only; no pruning based on listing status ever happens here.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

use fundsnap_core::error::Result;
use fundsnap_core::types::{Cik, Ticker};

use crate::COMPANY_TICKERS_URL;
use crate::client::EdgarClient;

/// One entry of the registry JSON (keyed by an irrelevant integer index).
#[derive(Debug, Deserialize)]
struct RegistryEntry {
    cik_str: u64,
    ticker: String,
    title: String,
}

/// In-memory ticker → issuer registry.
///
/// Lookups are case-insensitive (tickers normalize to uppercase). Unknown
/// tickers resolve to `None` - that is a coverage fact, not an error.
#[derive(Debug, Default)]
pub struct CikMap {
    entries: HashMap<Ticker, (Cik, String)>,
}

impl CikMap {
    /// Downloads and parses the registry.
    pub async fn load(client: &EdgarClient) -> Result<Self> {
        let raw: HashMap<String, RegistryEntry> = client.get_json(COMPANY_TICKERS_URL).await?;

        let mut entries = HashMap::with_capacity(raw.len());
        for entry in raw.into_values() {
            let ticker = Ticker::new(entry.ticker);
            if ticker.as_str().is_empty() {
                continue;
            }
            entries.insert(ticker, (Cik::from_u64(entry.cik_str), entry.title));
        }

        info!(entries = entries.len(), "CIK registry loaded");
        Ok(Self { entries })
    }

    /// Builds a map from explicit entries. Test seam.
    #[must_use]
    pub fn from_entries(pairs: Vec<(Ticker, Cik, String)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(t, c, name)| (t, (c, name)))
                .collect(),
        }
    }

    /// Resolves a ticker to its issuer identifier, or `None` if unknown.
    #[must_use]
    pub fn resolve(&self, ticker: &Ticker) -> Option<&Cik> {
        self.entries.get(ticker).map(|(cik, _)| cik)
    }

    /// Returns the registry company name for a ticker.
    #[must_use]
    pub fn company_name(&self, ticker: &Ticker) -> Option<&str> {
        self.entries.get(ticker).map(|(_, name)| name.as_str())
    }

    /// Number of registry entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CikMap {
        CikMap::from_entries(vec![
            (
                Ticker::new("AAPL"),
                Cik::new("320193"),
                "Apple Inc.".to_string(),
            ),
            (
                Ticker::new("MSFT"),
                Cik::new("789019"),
                "MICROSOFT CORP".to_string(),
            ),
        ])
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let map = sample();
        assert_eq!(
            map.resolve(&Ticker::new("aapl")).map(Cik::as_str),
            Some("0000320193")
        );
    }

    #[test]
    fn unknown_ticker_is_none_not_error() {
        let map = sample();
        assert!(map.resolve(&Ticker::new("ZZZZ_DELISTED")).is_none());
    }

    #[test]
    fn company_name_lookup() {
        let map = sample();
        assert_eq!(map.company_name(&Ticker::new("AAPL")), Some("Apple Inc."));
        assert_eq!(map.company_name(&Ticker::new("ZZZZ")), None);
    }

    #[test]
    fn registry_json_shape_parses() {
        let json = r#"{
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"}
        }"#;
        let raw: HashMap<String, RegistryEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw["0"].cik_str, 320193);
        assert_eq!(raw["0"].ticker, "AAPL");
        assert_eq!(raw["1"].title, "MICROSOFT CORP");
    }
}
