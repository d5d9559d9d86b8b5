//! Best-filing selection per fiscal period.
//!
//! The filings index already applied the primary PIT gate; this module
//! re-asserts it as a post-condition and collapses the survivors to one
//! filing per fiscal period (the latest acceptance wins, which covers
//! restatements and amendments visible at the cutoff).

use chrono::NaiveDate;
use std::collections::HashMap;

use fundsnap_core::dates::within_cutoff;
use fundsnap_core::error::{EngineError, Result};
use fundsnap_core::types::Filing;

/// Picks the single best filing per `period_end`.
///
/// Output is sorted ascending by period end so later periods overwrite
/// earlier rows during the table merge.
///
/// # Errors
/// [`EngineError::CutoffViolation`] if any input filing's acceptance falls
/// after the cutoff. The upstream gate makes this unreachable; reaching it
/// means the filter chain is broken and the snapshot must abort.
pub fn select_filings(filings: &[Filing], cutoff: NaiveDate) -> Result<Vec<Filing>> {
    for filing in filings {
        if !within_cutoff(filing.acceptance_datetime, cutoff) {
            return Err(EngineError::CutoffViolation {
                ticker: filing.ticker.to_string(),
                accession: filing.accession.clone(),
                acceptance_datetime: filing.acceptance_datetime,
                cutoff,
            });
        }
    }

    let mut by_period: HashMap<NaiveDate, &Filing> = HashMap::new();
    for filing in filings {
        by_period
            .entry(filing.period_end)
            .and_modify(|current| {
                let newer = (filing.acceptance_datetime, &filing.accession)
                    > (current.acceptance_datetime, &current.accession);
                if newer {
                    *current = filing;
                }
            })
            .or_insert(filing);
    }

    let mut selected: Vec<Filing> = by_period.into_values().cloned().collect();
    selected.sort_by_key(|f| f.period_end);
    Ok(selected)
}
