//! Company-facts fetching and parsing.
//!
//! The company-facts endpoint returns every XBRL fact the issuer has ever
//! reported, grouped by taxonomy and tag. Facts are parsed into per-tag
//! streams keyed `namespace:Tag`, carrying their source accession and filed
//! date so downstream selection can cross-check the cutoff.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use fundsnap_core::dates::parse_date;
use fundsnap_core::error::Result;
use fundsnap_core::types::{Cik, XbrlFact};

use crate::EDGAR_BASE_URL;
use crate::client::EdgarClient;

/// Taxonomy namespaces scanned for facts.
const NAMESPACES: &[&str] = &["us-gaap", "ifrs-full", "dei"];

/// Facts keyed by fully-qualified tag.
#[derive(Debug, Default)]
pub struct FactStore {
    facts: HashMap<String, Vec<XbrlFact>>,
}

impl FactStore {
    /// Returns all facts for a fully-qualified tag (`us-gaap:Revenues`).
    #[must_use]
    pub fn facts_for(&self, tag: &str) -> &[XbrlFact] {
        self.facts.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Adds a fact under its own tag. Test seam and merge hook.
    pub fn insert(&mut self, fact: XbrlFact) {
        self.facts.entry(fact.tag.clone()).or_default().push(fact);
    }

    /// Number of distinct tags.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.facts.len()
    }

    /// Total number of facts across tags.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.values().map(Vec::len).sum()
    }
}

/// Raw company-facts document.
#[derive(Debug, Deserialize)]
struct CompanyFacts {
    #[serde(default)]
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

#[derive(Debug, Deserialize)]
struct TagFacts {
    #[serde(default)]
    units: HashMap<String, Vec<RawFact>>,
}

#[derive(Debug, Deserialize)]
struct RawFact {
    #[serde(default)]
    val: Option<f64>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    accn: Option<String>,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    frame: Option<String>,
    #[serde(default)]
    filed: Option<String>,
}

/// Returns true for units the engine keeps.
///
/// Monetary facts are face-value USD only (no FX); share counts, per-share
/// amounts, and pure ratios pass through in native units. Foreign-currency
/// monetary units are dropped.
fn unit_is_supported(unit: &str) -> bool {
    matches!(unit, "USD" | "shares" | "USD/shares" | "pure")
}

/// Fetches and parses all facts for one issuer.
///
/// Malformed individual entries are skipped; a malformed document is a parse
/// error (per-ticker fatal, recorded in coverage by the caller).
pub async fn fetch_company_facts(client: &EdgarClient, cik: &Cik) -> Result<FactStore> {
    let url = format!(
        "{EDGAR_BASE_URL}/api/xbrl/companyfacts/CIK{}.json",
        cik.as_str()
    );
    let raw: CompanyFacts = client.get_json(&url).await?;

    let mut store = FactStore::default();
    for namespace in NAMESPACES {
        let Some(tags) = raw.facts.get(*namespace) else {
            continue;
        };
        for (tag, tag_facts) in tags {
            let key = format!("{namespace}:{tag}");
            for (unit, entries) in &tag_facts.units {
                if !unit_is_supported(unit) {
                    continue;
                }
                for entry in entries {
                    if let Some(fact) = parse_entry(&key, unit, entry) {
                        store.facts.entry(key.clone()).or_default().push(fact);
                    }
                }
            }
        }
    }

    info!(
        cik = %cik,
        tags = store.tag_count(),
        facts = store.fact_count(),
        "company facts fetched"
    );
    Ok(store)
}

fn parse_entry(tag: &str, unit: &str, entry: &RawFact) -> Option<XbrlFact> {
    let value = entry.val?;
    let end = entry.end.as_deref().and_then(parse_date)?;
    let filed = entry.filed.as_deref().and_then(parse_date);
    let Some(filed) = filed else {
        debug!(tag, "skipping fact without filed date");
        return None;
    };
    let start = entry.start.as_deref().and_then(parse_date);

    Some(XbrlFact {
        tag: tag.to_string(),
        value,
        unit: unit.to_string(),
        start,
        end,
        accession: entry.accn.clone().unwrap_or_default(),
        form: entry.form.clone().unwrap_or_default(),
        frame: entry.frame.clone(),
        dimensions: BTreeMap::new(),
        filed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fundsnap_core::period::PeriodKind;

    #[test]
    fn unit_filter_keeps_usd_and_counts() {
        assert!(unit_is_supported("USD"));
        assert!(unit_is_supported("shares"));
        assert!(unit_is_supported("USD/shares"));
        assert!(unit_is_supported("pure"));
        assert!(!unit_is_supported("EUR"));
        assert!(!unit_is_supported("JPY"));
    }

    #[test]
    fn company_facts_document_parses() {
        let json = r#"{
            "cik": 320193,
            "entityName": "Apple Inc.",
            "facts": {
                "us-gaap": {
                    "Revenues": {
                        "label": "Revenues",
                        "units": {
                            "USD": [
                                {"start": "2015-09-27", "end": "2016-09-24",
                                 "val": 215639000000.0,
                                 "accn": "0000320193-16-000070", "fy": 2016,
                                 "fp": "FY", "form": "10-K",
                                 "filed": "2016-10-26", "frame": "CY2016"},
                                {"end": "2016-09-24", "val": 1.0,
                                 "accn": "0000320193-16-000070", "form": "10-K"}
                            ],
                            "EUR": [
                                {"start": "2015-09-27", "end": "2016-09-24",
                                 "val": 1.0, "accn": "x", "form": "10-K",
                                 "filed": "2016-10-26"}
                            ]
                        }
                    }
                },
                "dei": {
                    "EntityCommonStockSharesOutstanding": {
                        "units": {
                            "shares": [
                                {"end": "2016-10-14", "val": 5332313000.0,
                                 "accn": "0000320193-16-000070", "form": "10-K",
                                 "filed": "2016-10-26"}
                            ]
                        }
                    }
                }
            }
        }"#;

        let raw: CompanyFacts = serde_json::from_str(json).unwrap();
        let mut store = FactStore::default();
        for namespace in NAMESPACES {
            let Some(tags) = raw.facts.get(*namespace) else {
                continue;
            };
            for (tag, tag_facts) in tags {
                let key = format!("{namespace}:{tag}");
                for (unit, entries) in &tag_facts.units {
                    if !unit_is_supported(unit) {
                        continue;
                    }
                    for entry in entries {
                        if let Some(fact) = parse_entry(&key, unit, entry) {
                            store.insert(fact);
                        }
                    }
                }
            }
        }

        // Revenue: one valid USD fact (the filed-less entry and the EUR unit drop)
        let revenues = store.facts_for("us-gaap:Revenues");
        assert_eq!(revenues.len(), 1);
        let fact = &revenues[0];
        assert_eq!(fact.value, 215_639_000_000.0);
        assert_eq!(fact.unit, "USD");
        assert_eq!(fact.period_kind(), PeriodKind::Duration);
        assert_eq!(fact.accession, "0000320193-16-000070");
        assert_eq!(fact.filed, NaiveDate::from_ymd_opt(2016, 10, 26).unwrap());
        assert_eq!(fact.frame.as_deref(), Some("CY2016"));
        assert!(fact.is_consolidated());

        // DEI shares pass through in native units
        let shares = store.facts_for("dei:EntityCommonStockSharesOutstanding");
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].period_kind(), PeriodKind::Instant);
    }

    #[test]
    fn unknown_tag_returns_empty_slice() {
        let store = FactStore::default();
        assert!(store.facts_for("us-gaap:Nonexistent").is_empty());
    }
}
