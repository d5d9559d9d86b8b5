//! Snapshot serialization to columnar files.
//!
//! Converts the typed row tables into polars DataFrames and writes them
//! under `{output_dir}/{cutoff}/` as Parquet or CSV, with the coverage
//! report as JSON alongside. Dates are written as ISO strings.

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use fundsnap_core::error::{EngineError, Result};
use fundsnap_core::types::{
    BalanceRow, CashflowRow, CompanyRow, CoverageReport, DerivedRow, FilingRow, IncomeRow,
    SnapshotResult, SnapshotTables,
};

/// Output file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Apache Parquet (default for downstream consumers).
    Parquet,
    /// Comma-separated values.
    Csv,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
        }
    }
}

/// Writes every non-empty table of a snapshot to disk.
///
/// Returns the paths written, coverage report included.
///
/// # Errors
/// Filesystem or serialization failures.
pub fn write_snapshot(
    result: &SnapshotResult,
    output_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let dated_dir = output_dir.join(result.cutoff.to_string());
    std::fs::create_dir_all(&dated_dir).map_err(|e| EngineError::Io(e.to_string()))?;

    let frames = [
        (SnapshotTables::COMPANY_MASTER, company_frame(&result.tables.company_master)?),
        (SnapshotTables::FILINGS, filings_frame(&result.tables.filings)?),
        (
            SnapshotTables::STATEMENTS_INCOME,
            income_frame(&result.tables.statements_income)?,
        ),
        (
            SnapshotTables::STATEMENTS_BALANCE,
            balance_frame(&result.tables.statements_balance)?,
        ),
        (
            SnapshotTables::STATEMENTS_CASHFLOW,
            cashflow_frame(&result.tables.statements_cashflow)?,
        ),
        (
            SnapshotTables::DERIVED_METRICS,
            derived_frame(&result.tables.derived_metrics)?,
        ),
    ];

    let mut written = Vec::new();
    for (name, mut df) in frames {
        if df.height() == 0 {
            warn!(table = name, "table is empty, skipping write");
            continue;
        }
        let path = dated_dir.join(format!("{name}.{}", format.extension()));
        let file = File::create(&path).map_err(|e| EngineError::Io(e.to_string()))?;
        match format {
            OutputFormat::Parquet => {
                ParquetWriter::new(file)
                    .finish(&mut df)
                    .map_err(|e| EngineError::Io(e.to_string()))?;
            }
            OutputFormat::Csv => {
                CsvWriter::new(file)
                    .include_header(true)
                    .finish(&mut df)
                    .map_err(|e| EngineError::Io(e.to_string()))?;
            }
        }
        info!(table = name, rows = df.height(), path = %path.display(), "table written");
        written.push(path);
    }

    written.push(write_coverage(&result.coverage, &dated_dir)?);
    Ok(written)
}

fn write_coverage(coverage: &CoverageReport, dir: &Path) -> Result<PathBuf> {
    let path = dir.join("coverage_report.json");
    let file = File::create(&path).map_err(|e| EngineError::Io(e.to_string()))?;
    serde_json::to_writer_pretty(file, coverage).map_err(|e| EngineError::Io(e.to_string()))?;
    info!(path = %path.display(), "coverage report written");
    Ok(path)
}

fn frame(columns: Vec<Column>) -> Result<DataFrame> {
    DataFrame::new(columns).map_err(|e| EngineError::Io(e.to_string()))
}

fn str_col(name: &str, values: Vec<&str>) -> Column {
    Column::new(name.into(), values)
}

fn opt_str_col(name: &str, values: Vec<Option<&str>>) -> Column {
    Column::new(name.into(), values)
}

fn date_col(name: &str, values: Vec<String>) -> Column {
    Column::new(name.into(), values)
}

fn f64_col(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::new(name.into(), values)
}

fn bool_col(name: &str, values: Vec<Option<bool>>) -> Column {
    Column::new(name.into(), values)
}

fn company_frame(rows: &[CompanyRow]) -> Result<DataFrame> {
    frame(vec![
        str_col("ticker", rows.iter().map(|r| r.ticker.as_str()).collect()),
        str_col("cik", rows.iter().map(|r| r.cik.as_str()).collect()),
        str_col(
            "company_name",
            rows.iter().map(|r| r.company_name.as_str()).collect(),
        ),
        opt_str_col("sic", rows.iter().map(|r| r.sic.as_deref()).collect()),
        opt_str_col(
            "exchange",
            rows.iter().map(|r| r.exchange.as_deref()).collect(),
        ),
    ])
}

fn filings_frame(rows: &[FilingRow]) -> Result<DataFrame> {
    frame(vec![
        str_col("ticker", rows.iter().map(|r| r.ticker.as_str()).collect()),
        str_col("cik", rows.iter().map(|r| r.cik.as_str()).collect()),
        str_col("accession", rows.iter().map(|r| r.accession.as_str()).collect()),
        str_col("form_type", rows.iter().map(|r| r.form_type.as_str()).collect()),
        date_col(
            "filing_date",
            rows.iter().map(|r| r.filing_date.to_string()).collect(),
        ),
        date_col(
            "acceptance_datetime",
            rows.iter()
                .map(|r| r.acceptance_datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
                .collect(),
        ),
        date_col(
            "period_end",
            rows.iter().map(|r| r.period_end.to_string()).collect(),
        ),
    ])
}

fn income_frame(rows: &[IncomeRow]) -> Result<DataFrame> {
    frame(vec![
        str_col("ticker", rows.iter().map(|r| r.ticker.as_str()).collect()),
        str_col("cik", rows.iter().map(|r| r.cik.as_str()).collect()),
        str_col("accession", rows.iter().map(|r| r.accession.as_str()).collect()),
        date_col(
            "asof_date",
            rows.iter().map(|r| r.asof_date.to_string()).collect(),
        ),
        date_col(
            "period_end",
            rows.iter().map(|r| r.period_end.to_string()).collect(),
        ),
        f64_col("revenue", rows.iter().map(|r| r.revenue).collect()),
        f64_col(
            "cost_of_revenue",
            rows.iter().map(|r| r.cost_of_revenue).collect(),
        ),
        f64_col("gross_profit", rows.iter().map(|r| r.gross_profit).collect()),
        f64_col(
            "operating_expenses",
            rows.iter().map(|r| r.operating_expenses).collect(),
        ),
        f64_col("ebit", rows.iter().map(|r| r.ebit).collect()),
        f64_col("ebitda", rows.iter().map(|r| r.ebitda).collect()),
        f64_col(
            "interest_expense",
            rows.iter().map(|r| r.interest_expense).collect(),
        ),
        f64_col(
            "pretax_income",
            rows.iter().map(|r| r.pretax_income).collect(),
        ),
        f64_col(
            "income_tax_expense",
            rows.iter().map(|r| r.income_tax_expense).collect(),
        ),
        f64_col("net_income", rows.iter().map(|r| r.net_income).collect()),
        f64_col("eps_basic", rows.iter().map(|r| r.eps_basic).collect()),
        f64_col("eps_diluted", rows.iter().map(|r| r.eps_diluted).collect()),
        f64_col("shares_basic", rows.iter().map(|r| r.shares_basic).collect()),
        f64_col(
            "shares_diluted",
            rows.iter().map(|r| r.shares_diluted).collect(),
        ),
    ])
}

fn balance_frame(rows: &[BalanceRow]) -> Result<DataFrame> {
    frame(vec![
        str_col("ticker", rows.iter().map(|r| r.ticker.as_str()).collect()),
        str_col("cik", rows.iter().map(|r| r.cik.as_str()).collect()),
        str_col("accession", rows.iter().map(|r| r.accession.as_str()).collect()),
        date_col(
            "asof_date",
            rows.iter().map(|r| r.asof_date.to_string()).collect(),
        ),
        date_col(
            "period_end",
            rows.iter().map(|r| r.period_end.to_string()).collect(),
        ),
        f64_col(
            "cash_and_equivalents",
            rows.iter().map(|r| r.cash_and_equivalents).collect(),
        ),
        f64_col(
            "short_term_investments",
            rows.iter().map(|r| r.short_term_investments).collect(),
        ),
        f64_col(
            "accounts_receivable",
            rows.iter().map(|r| r.accounts_receivable).collect(),
        ),
        f64_col("inventory", rows.iter().map(|r| r.inventory).collect()),
        f64_col(
            "current_assets",
            rows.iter().map(|r| r.current_assets).collect(),
        ),
        f64_col("ppe_net", rows.iter().map(|r| r.ppe_net).collect()),
        f64_col("goodwill", rows.iter().map(|r| r.goodwill).collect()),
        f64_col("intangibles", rows.iter().map(|r| r.intangibles).collect()),
        f64_col("total_assets", rows.iter().map(|r| r.total_assets).collect()),
        f64_col(
            "accounts_payable",
            rows.iter().map(|r| r.accounts_payable).collect(),
        ),
        f64_col(
            "short_term_debt",
            rows.iter().map(|r| r.short_term_debt).collect(),
        ),
        f64_col(
            "current_liabilities",
            rows.iter().map(|r| r.current_liabilities).collect(),
        ),
        f64_col(
            "long_term_debt",
            rows.iter().map(|r| r.long_term_debt).collect(),
        ),
        f64_col(
            "total_liabilities",
            rows.iter().map(|r| r.total_liabilities).collect(),
        ),
        f64_col(
            "common_equity",
            rows.iter().map(|r| r.common_equity).collect(),
        ),
        f64_col(
            "retained_earnings",
            rows.iter().map(|r| r.retained_earnings).collect(),
        ),
        f64_col("total_equity", rows.iter().map(|r| r.total_equity).collect()),
        bool_col("identity_ok", rows.iter().map(|r| r.identity_ok).collect()),
    ])
}

fn cashflow_frame(rows: &[CashflowRow]) -> Result<DataFrame> {
    frame(vec![
        str_col("ticker", rows.iter().map(|r| r.ticker.as_str()).collect()),
        str_col("cik", rows.iter().map(|r| r.cik.as_str()).collect()),
        str_col("accession", rows.iter().map(|r| r.accession.as_str()).collect()),
        date_col(
            "asof_date",
            rows.iter().map(|r| r.asof_date.to_string()).collect(),
        ),
        date_col(
            "period_end",
            rows.iter().map(|r| r.period_end.to_string()).collect(),
        ),
        f64_col("cfo", rows.iter().map(|r| r.cfo).collect()),
        f64_col("capex", rows.iter().map(|r| r.capex).collect()),
        f64_col(
            "free_cash_flow",
            rows.iter().map(|r| r.free_cash_flow).collect(),
        ),
        f64_col("cfi", rows.iter().map(|r| r.cfi).collect()),
        f64_col("cff", rows.iter().map(|r| r.cff).collect()),
        f64_col(
            "dividends_paid",
            rows.iter().map(|r| r.dividends_paid).collect(),
        ),
        f64_col(
            "share_repurchases",
            rows.iter().map(|r| r.share_repurchases).collect(),
        ),
        f64_col(
            "net_change_in_cash",
            rows.iter().map(|r| r.net_change_in_cash).collect(),
        ),
        f64_col(
            "depreciation_amortization",
            rows.iter().map(|r| r.depreciation_amortization).collect(),
        ),
        f64_col(
            "stock_based_compensation",
            rows.iter().map(|r| r.stock_based_compensation).collect(),
        ),
        bool_col("reconciles", rows.iter().map(|r| r.reconciles).collect()),
    ])
}

fn derived_frame(rows: &[DerivedRow]) -> Result<DataFrame> {
    frame(vec![
        str_col("ticker", rows.iter().map(|r| r.ticker.as_str()).collect()),
        str_col("cik", rows.iter().map(|r| r.cik.as_str()).collect()),
        str_col("accession", rows.iter().map(|r| r.accession.as_str()).collect()),
        date_col(
            "asof_date",
            rows.iter().map(|r| r.asof_date.to_string()).collect(),
        ),
        date_col(
            "period_end",
            rows.iter().map(|r| r.period_end.to_string()).collect(),
        ),
        f64_col("gross_margin", rows.iter().map(|r| r.gross_margin).collect()),
        f64_col("ebit_margin", rows.iter().map(|r| r.ebit_margin).collect()),
        f64_col("net_margin", rows.iter().map(|r| r.net_margin).collect()),
        f64_col("roa", rows.iter().map(|r| r.roa).collect()),
        f64_col("roe", rows.iter().map(|r| r.roe).collect()),
        f64_col("roic", rows.iter().map(|r| r.roic).collect()),
        f64_col(
            "current_ratio",
            rows.iter().map(|r| r.current_ratio).collect(),
        ),
        f64_col("quick_ratio", rows.iter().map(|r| r.quick_ratio).collect()),
        f64_col(
            "debt_to_equity",
            rows.iter().map(|r| r.debt_to_equity).collect(),
        ),
        f64_col("net_debt", rows.iter().map(|r| r.net_debt).collect()),
        f64_col("fcf_yield", rows.iter().map(|r| r.fcf_yield).collect()),
    ])
}
