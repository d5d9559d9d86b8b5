//! Accounting identity checks on assembled tables.
//!
//! Violations are warnings, not errors: the offending rows are annotated
//! and kept, and an issue is recorded in the coverage report. The one check
//! that does abort is the final point-in-time assertion.

use chrono::NaiveDate;
use tracing::warn;

use fundsnap_core::error::{EngineError, Result};
use fundsnap_core::types::{
    BalanceRow, CashflowRow, IssueKind, SnapshotTables, TickerIssue,
};

/// Relative tolerance for Assets ≈ Liabilities + Equity.
pub const BALANCE_SHEET_TOLERANCE: f64 = 0.01;

/// Relative tolerance for the cash flow reconciliation.
const CASHFLOW_TOLERANCE: f64 = 0.01;

/// Absolute floor on the cash flow tolerance; avoids flagging rounding noise
/// on small balances.
const CASHFLOW_TOLERANCE_FLOOR: f64 = 1_000_000.0;

/// Checks `|assets - (liabilities + equity)| / assets < 1%` on every row.
///
/// Sets `identity_ok` per row (`None` when assets are missing or zero) and
/// returns one issue per violating row.
pub fn check_balance_identity(rows: &mut [BalanceRow]) -> Vec<TickerIssue> {
    let mut issues = Vec::new();

    for row in rows {
        let Some(assets) = row.total_assets.filter(|a| a.abs() > 0.0) else {
            row.identity_ok = None;
            continue;
        };
        let liabilities = row.total_liabilities.unwrap_or(0.0);
        let equity = row.total_equity.unwrap_or(0.0);
        let relative_error = (assets - (liabilities + equity)).abs() / assets.abs();

        let ok = relative_error < BALANCE_SHEET_TOLERANCE;
        row.identity_ok = Some(ok);

        if !ok {
            warn!(
                ticker = %row.ticker,
                accession = %row.accession,
                assets,
                liabilities_plus_equity = liabilities + equity,
                relative_error,
                "balance sheet identity violation"
            );
            issues.push(TickerIssue {
                ticker: row.ticker.clone(),
                kind: IssueKind::Validation,
                detail: format!(
                    "balance identity off by {:.2}% for period {} ({})",
                    relative_error * 100.0,
                    row.period_end,
                    row.accession
                ),
            });
        }
    }

    issues
}

/// Checks `cfo + cfi + cff ≈ net_change_in_cash` on every row.
///
/// The tolerance is 1% of the larger side with a $1M floor. Sets
/// `reconciles` per row (`None` when no component was reported).
pub fn check_cashflow_reconciliation(rows: &mut [CashflowRow]) -> Vec<TickerIssue> {
    let mut issues = Vec::new();

    for row in rows {
        let no_components = row.cfo.is_none() && row.cfi.is_none() && row.cff.is_none();
        if no_components || row.net_change_in_cash.is_none() {
            row.reconciles = None;
            continue;
        }

        let computed = row.cfo.unwrap_or(0.0) + row.cfi.unwrap_or(0.0) + row.cff.unwrap_or(0.0);
        let reported = row.net_change_in_cash.unwrap_or(0.0);
        let tolerance =
            (computed.abs().max(reported.abs()) * CASHFLOW_TOLERANCE).max(CASHFLOW_TOLERANCE_FLOOR);

        let ok = (computed - reported).abs() <= tolerance;
        row.reconciles = Some(ok);

        if !ok {
            warn!(
                ticker = %row.ticker,
                accession = %row.accession,
                computed,
                reported,
                "cash flow reconciliation error"
            );
            issues.push(TickerIssue {
                ticker: row.ticker.clone(),
                kind: IssueKind::Validation,
                detail: format!(
                    "cash flow does not reconcile for period {} ({})",
                    row.period_end, row.accession
                ),
            });
        }
    }

    issues
}

/// The emission-time point-in-time assertion.
///
/// Every row in every table must have `asof_date <= cutoff`; the filings
/// table is checked on the acceptance date. The filter chain makes this
/// provable, so a failure is a programming error that aborts the snapshot.
pub fn assert_pit_invariant(tables: &SnapshotTables, cutoff: NaiveDate) -> Result<()> {
    let mut offenders: Vec<(String, String, NaiveDate)> = Vec::new();

    for row in &tables.filings {
        if row.acceptance_datetime.date() > cutoff {
            offenders.push((
                row.ticker.to_string(),
                row.accession.clone(),
                row.acceptance_datetime.date(),
            ));
        }
    }
    macro_rules! check_rows {
        ($rows:expr) => {
            for row in $rows {
                if row.asof_date > cutoff {
                    offenders.push((row.ticker.to_string(), row.accession.clone(), row.asof_date));
                }
            }
        };
    }
    check_rows!(&tables.statements_income);
    check_rows!(&tables.statements_balance);
    check_rows!(&tables.statements_cashflow);
    check_rows!(&tables.derived_metrics);

    if let Some((ticker, accession, asof)) = offenders.into_iter().next() {
        return Err(EngineError::CutoffViolation {
            ticker,
            accession,
            acceptance_datetime: asof.and_hms_opt(0, 0, 0).expect("valid time"),
            cutoff,
        });
    }
    Ok(())
}
