//! Fact selection for a target fiscal period under a cutoff.
//!
//! For one tag's fact stream, [`select_best_fact`] picks the single fact an
//! investor could have seen on the cutoff date for a given fiscal period:
//!
//! 1. `filed <= cutoff` (secondary PIT gate; the filings index is the
//!    primary gate, this one catches facts arriving via other filings).
//! 2. Period match: duration facts must span the annual/quarterly window
//!    and end within ±3 days of the target period end (52/53-week fiscal
//!    calendars drift); instant facts just need the end match.
//! 3. Consolidated facts only. A `frame` label is a preference signal among
//!    survivors, never a hard filter: issuers with non-calendar fiscal
//!    years get no frame on their annual totals.
//! 4. Latest `filed` wins (the most recent restatement visible at the
//!    cutoff); on a filed-date tie the original form beats an amendment.

use chrono::NaiveDate;

use fundsnap_core::dates::{PERIOD_END_TOLERANCE_DAYS, is_annual_period, is_quarterly_period};
use fundsnap_core::period::{PeriodKind, PeriodType};
use fundsnap_core::types::XbrlFact;

/// Selects the best fact for `target_end` visible as of `cutoff`.
///
/// Returns `None` when no fact survives filtering.
#[must_use]
pub fn select_best_fact<'a>(
    facts: &'a [XbrlFact],
    target_end: NaiveDate,
    period_type: PeriodType,
    period_kind: PeriodKind,
    cutoff: NaiveDate,
) -> Option<&'a XbrlFact> {
    let eligible: Vec<&XbrlFact> = facts
        .iter()
        .filter(|f| f.filed <= cutoff)
        .filter(|f| f.is_consolidated())
        .filter(|f| matches_period(f, target_end, period_type, period_kind))
        .collect();

    if eligible.is_empty() {
        return None;
    }

    // Exact end match beats fuzzy; among fuzzy matches the closest end wins.
    let exact: Vec<&XbrlFact> = eligible
        .iter()
        .copied()
        .filter(|f| f.end == target_end)
        .collect();
    let pool = if exact.is_empty() {
        let best_distance = eligible
            .iter()
            .map(|f| (f.end - target_end).num_days().abs())
            .min()?;
        eligible
            .into_iter()
            .filter(|f| (f.end - target_end).num_days().abs() == best_distance)
            .collect()
    } else {
        exact
    };

    // Frame preference within the period-matched pool.
    let framed: Vec<&XbrlFact> = pool.iter().copied().filter(|f| f.frame.is_some()).collect();
    let pool = if framed.is_empty() { pool } else { framed };

    pool.into_iter()
        .max_by_key(|f| (f.filed, !f.from_amendment()))
}

fn matches_period(
    fact: &XbrlFact,
    target_end: NaiveDate,
    period_type: PeriodType,
    period_kind: PeriodKind,
) -> bool {
    if (fact.end - target_end).num_days().abs() > PERIOD_END_TOLERANCE_DAYS {
        return false;
    }
    match period_kind {
        PeriodKind::Instant => fact.start.is_none(),
        PeriodKind::Duration => match period_type {
            PeriodType::Annual => is_annual_period(fact.start, fact.end),
            PeriodType::Quarterly => is_quarterly_period(fact.start, fact.end),
        },
    }
}
