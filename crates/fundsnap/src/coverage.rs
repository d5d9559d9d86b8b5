//! Coverage report construction.
//!
//! Coverage is the authoritative failure surface: every requested ticker
//! lands in exactly one of `resolved` / `missing_tickers`, and per-ticker
//! issues explain the misses. Delisted names are never silently dropped;
//! surfacing them here is what keeps downstream studies survivorship-free.

use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use fundsnap_core::types::{
    CoverageReport, IssueKind, SnapshotTables, Ticker, TickerIssue,
};

/// Fields whose total absence for a ticker is worth calling out.
const CORE_INCOME_FIELDS: &[&str] = &["revenue", "net_income", "ebit"];
const CORE_BALANCE_FIELDS: &[&str] = &["total_assets", "total_liabilities", "total_equity"];
const CORE_CASHFLOW_FIELDS: &[&str] = &["cfo", "capex"];

/// Builds the coverage report for a completed snapshot.
///
/// `issues` carries the per-ticker errors collected during the build; core
/// missing-field diagnostics are appended here.
#[must_use]
pub fn build_coverage(
    requested: &[Ticker],
    tables: &SnapshotTables,
    mut issues: Vec<TickerIssue>,
) -> CoverageReport {
    let mut present: HashSet<&Ticker> = HashSet::new();
    present.extend(tables.statements_income.iter().map(|r| &r.ticker));
    present.extend(tables.statements_balance.iter().map(|r| &r.ticker));
    present.extend(tables.statements_cashflow.iter().map(|r| &r.ticker));

    let resolved: Vec<Ticker> = requested
        .iter()
        .filter(|t| present.contains(t))
        .cloned()
        .collect();
    let missing: Vec<Ticker> = requested
        .iter()
        .filter(|t| !present.contains(t))
        .cloned()
        .collect();

    let mut filing_counts: HashMap<Ticker, usize> = HashMap::new();
    for row in &tables.statements_income {
        *filing_counts.entry(row.ticker.clone()).or_default() += 1;
    }

    for ticker in &resolved {
        let mut absent: Vec<&'static str> = Vec::new();
        check_income_fields(tables, ticker, &mut absent);
        check_balance_fields(tables, ticker, &mut absent);
        check_cashflow_fields(tables, ticker, &mut absent);
        if !absent.is_empty() {
            issues.push(TickerIssue {
                ticker: ticker.clone(),
                kind: IssueKind::Validation,
                detail: format!("core fields entirely missing: {}", absent.join(", ")),
            });
        }
    }

    // Workers finish in arbitrary order; a stable sort keeps reports
    // reproducible across runs.
    issues.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let report = CoverageReport {
        requested: requested.to_vec(),
        resolved,
        missing_tickers: missing,
        issues,
        filing_counts,
    };

    info!(
        resolved = report.resolved.len(),
        requested = report.requested.len(),
        ratio = format!("{:.1}%", report.coverage_ratio() * 100.0),
        "coverage computed"
    );
    if !report.missing_tickers.is_empty() {
        warn!(missing = ?report.missing_tickers, "tickers with no data");
    }

    report
}

fn check_income_fields(tables: &SnapshotTables, ticker: &Ticker, absent: &mut Vec<&'static str>) {
    let rows: Vec<_> = tables
        .statements_income
        .iter()
        .filter(|r| &r.ticker == ticker)
        .collect();
    if rows.is_empty() {
        return;
    }
    for field in CORE_INCOME_FIELDS {
        let all_null = rows.iter().all(|r| match *field {
            "revenue" => r.revenue.is_none(),
            "net_income" => r.net_income.is_none(),
            "ebit" => r.ebit.is_none(),
            _ => false,
        });
        if all_null {
            absent.push(field);
        }
    }
}

fn check_balance_fields(tables: &SnapshotTables, ticker: &Ticker, absent: &mut Vec<&'static str>) {
    let rows: Vec<_> = tables
        .statements_balance
        .iter()
        .filter(|r| &r.ticker == ticker)
        .collect();
    if rows.is_empty() {
        return;
    }
    for field in CORE_BALANCE_FIELDS {
        let all_null = rows.iter().all(|r| match *field {
            "total_assets" => r.total_assets.is_none(),
            "total_liabilities" => r.total_liabilities.is_none(),
            "total_equity" => r.total_equity.is_none(),
            _ => false,
        });
        if all_null {
            absent.push(field);
        }
    }
}

fn check_cashflow_fields(tables: &SnapshotTables, ticker: &Ticker, absent: &mut Vec<&'static str>) {
    let rows: Vec<_> = tables
        .statements_cashflow
        .iter()
        .filter(|r| &r.ticker == ticker)
        .collect();
    if rows.is_empty() {
        return;
    }
    for field in CORE_CASHFLOW_FIELDS {
        let all_null = rows.iter().all(|r| match *field {
            "cfo" => r.cfo.is_none(),
            "capex" => r.capex.is_none(),
            _ => false,
        });
        if all_null {
            absent.push(field);
        }
    }
}
