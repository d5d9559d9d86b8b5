//! Snapshot build orchestration.
//!
//! [`SnapshotBuilder`] fans the per-ticker pipeline out across a bounded
//! worker pool: resolve → filings index → selector → company facts →
//! assemble rows, then merges everything into keyed table accumulators,
//! validates, and emits a [`SnapshotResult`] with its coverage report.
//!
//! Per-ticker failures are isolated: one ticker's network or parse error is
//! recorded in coverage and the rest continue. A cutoff violation aborts
//! the whole build and no partial result is emitted.

use futures::stream::{self, StreamExt};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use chrono::NaiveDate;
use fundsnap_cache::SqliteHttpCache;
use fundsnap_core::cache::HttpCache;
use fundsnap_core::config::EngineConfig;
use fundsnap_core::error::{EngineError, Result};
use fundsnap_core::types::{
    BalanceRow, CashflowRow, Cik, CompanyRow, DerivedRow, FilingRow, IncomeRow, IssueKind,
    SnapshotRequest, SnapshotResult, SnapshotTables, TableRow, Ticker, TickerIssue,
};
use fundsnap_edgar::{
    CikMap, EdgarClient, FilingsIndex, StatementAssembler, fetch_company_facts,
};

use crate::coverage::build_coverage;
use crate::selector::select_filings;
use crate::validation::{
    assert_pit_invariant, check_balance_identity, check_cashflow_reconciliation,
};

/// Rows produced by one ticker's pipeline, before the cross-ticker merge.
#[derive(Debug, Default)]
struct TickerOutput {
    filings: Vec<FilingRow>,
    income: Vec<IncomeRow>,
    balance: Vec<BalanceRow>,
    cashflow: Vec<CashflowRow>,
    derived: Vec<DerivedRow>,
}

impl TickerOutput {
    fn is_empty(&self) -> bool {
        self.filings.is_empty()
            && self.income.is_empty()
            && self.balance.is_empty()
            && self.cashflow.is_empty()
            && self.derived.is_empty()
    }
}

/// Builds point-in-time fundamental snapshots.
#[derive(Clone, Debug)]
pub struct SnapshotBuilder {
    config: EngineConfig,
    client: EdgarClient,
}

impl SnapshotBuilder {
    /// Creates a builder with the default on-disk response cache under
    /// `config.cache_dir`.
    ///
    /// # Errors
    /// Cache or HTTP client construction failures.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let cache: Arc<dyn HttpCache> =
            Arc::new(SqliteHttpCache::new(config.cache_dir.join("edgar_http.db"))?);
        Self::with_cache(config, cache)
    }

    /// Creates a builder with an explicit response cache.
    ///
    /// # Errors
    /// HTTP client construction failures.
    pub fn with_cache(config: EngineConfig, cache: Arc<dyn HttpCache>) -> Result<Self> {
        let client = EdgarClient::new(&config, cache)?;
        Ok(Self { config, client })
    }

    /// Builds a snapshot for the request.
    ///
    /// # Errors
    /// - [`EngineError::InvalidRequest`] for lookahead-unsafe options
    /// - [`EngineError::CutoffViolation`] if the filter chain is broken
    /// - [`EngineError::Auth`] / registry-level network failures
    ///
    /// Per-ticker failures do not error; they appear in the coverage report.
    pub async fn build(&self, request: &SnapshotRequest) -> Result<SnapshotResult> {
        request.validate()?;
        info!(
            tickers = request.tickers.len(),
            cutoff = %request.cutoff,
            period = ?request.period_type,
            "building snapshot"
        );

        let cik_map = CikMap::load(&self.client).await?;

        // De-duplicate while keeping request order.
        let mut seen = HashSet::new();
        let requested: Vec<Ticker> = request
            .tickers
            .iter()
            .filter(|t| seen.insert((*t).clone()))
            .cloned()
            .collect();

        let mut issues: Vec<TickerIssue> = Vec::new();
        let mut company_master: Vec<CompanyRow> = Vec::new();
        let mut candidates: Vec<(Ticker, Cik)> = Vec::new();

        for ticker in &requested {
            match cik_map.resolve(ticker) {
                Some(cik) => {
                    company_master.push(CompanyRow {
                        ticker: ticker.clone(),
                        cik: cik.clone(),
                        company_name: cik_map
                            .company_name(ticker)
                            .unwrap_or_default()
                            .to_string(),
                        sic: None,
                        exchange: None,
                    });
                    candidates.push((ticker.clone(), cik.clone()));
                }
                None => {
                    warn!(%ticker, "ticker not in issuer registry");
                    issues.push(TickerIssue {
                        ticker: ticker.clone(),
                        kind: IssueKind::NotFound,
                        detail: "not in issuer registry".into(),
                    });
                }
            }
        }
        company_master.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        let mut income_acc = HashMap::new();
        let mut balance_acc = HashMap::new();
        let mut cashflow_acc = HashMap::new();
        let mut derived_acc = HashMap::new();
        let mut filing_rows: HashMap<(Ticker, String), FilingRow> = HashMap::new();

        let mut tasks = stream::iter(candidates.into_iter().map(|(ticker, cik)| {
            let client = self.client.clone();
            async move {
                let outcome = process_ticker(&client, &ticker, &cik, request).await;
                (ticker, outcome)
            }
        }))
        .buffer_unordered(self.config.max_concurrency);

        while let Some((ticker, outcome)) = tasks.next().await {
            match outcome {
                Ok(output) => {
                    if output.is_empty() {
                        issues.push(TickerIssue {
                            ticker: ticker.clone(),
                            kind: IssueKind::NoFilings,
                            detail: "no qualifying filings visible at the cutoff".into(),
                        });
                        continue;
                    }
                    for row in output.filings {
                        filing_rows.insert((row.ticker.clone(), row.accession.clone()), row);
                    }
                    merge_rows(&mut income_acc, output.income);
                    merge_rows(&mut balance_acc, output.balance);
                    merge_rows(&mut cashflow_acc, output.cashflow);
                    merge_rows(&mut derived_acc, output.derived);
                }
                Err(e) if e.is_per_ticker() => {
                    warn!(%ticker, error = %e, "ticker failed; continuing");
                    issues.push(TickerIssue {
                        ticker: ticker.clone(),
                        kind: issue_kind(&e),
                        detail: e.to_string(),
                    });
                }
                // Fatal: dropping the task stream stops dispatch and abandons
                // in-flight tickers; no partial result is emitted.
                Err(e) => return Err(e),
            }
        }

        let mut filings_table: Vec<FilingRow> = filing_rows.into_values().collect();
        filings_table.sort_by(|a, b| {
            a.ticker
                .cmp(&b.ticker)
                .then_with(|| a.period_end.cmp(&b.period_end))
                .then_with(|| a.accession.cmp(&b.accession))
        });

        let mut tables = SnapshotTables {
            company_master,
            filings: filings_table,
            statements_income: sorted_rows(income_acc),
            statements_balance: sorted_rows(balance_acc),
            statements_cashflow: sorted_rows(cashflow_acc),
            derived_metrics: sorted_rows(derived_acc),
        };

        issues.extend(check_balance_identity(&mut tables.statements_balance));
        issues.extend(check_cashflow_reconciliation(&mut tables.statements_cashflow));

        // Final gate: provable from the filter chain, asserted once more.
        assert_pit_invariant(&tables, request.cutoff)?;

        let coverage = build_coverage(&requested, &tables, issues);
        info!(rows = tables.total_rows(), "snapshot built");

        Ok(SnapshotResult {
            cutoff: request.cutoff,
            tables,
            coverage,
        })
    }
}

/// The sequential per-ticker pipeline.
async fn process_ticker(
    client: &EdgarClient,
    ticker: &Ticker,
    cik: &Cik,
    request: &SnapshotRequest,
) -> Result<TickerOutput> {
    let index = FilingsIndex::new(client.clone());
    let filings = index
        .fetch(
            cik,
            ticker,
            request.cutoff,
            request.period_type,
            request.include_amendments,
        )
        .await?;
    let selected = select_filings(&filings, request.cutoff)?;
    if selected.is_empty() {
        return Ok(TickerOutput::default());
    }

    let store = fetch_company_facts(client, cik).await?;
    let assembler = StatementAssembler::new(ticker.clone(), cik.clone());

    let mut output = TickerOutput::default();
    // Ascending period order (the selector guarantees it): restatements that
    // span periods overwrite earlier rows in the merge.
    for filing in &selected {
        output.filings.push(FilingRow::from_filing(filing));

        let income = assembler.income_row(&store, filing, request.period_type, request.cutoff);
        let balance = assembler.balance_row(&store, filing, request.period_type, request.cutoff);
        let cashflow = assembler.cashflow_row(&store, filing, request.period_type, request.cutoff);

        if let Some(row) = assembler.derived_row(income.as_ref(), balance.as_ref(), filing) {
            output.derived.push(row);
        }
        if let Some(row) = income {
            output.income.push(row);
        }
        if let Some(row) = balance {
            output.balance.push(row);
        }
        if let Some(row) = cashflow {
            output.cashflow.push(row);
        }
    }
    Ok(output)
}

fn issue_kind(error: &EngineError) -> IssueKind {
    match error {
        EngineError::NotFound(_) | EngineError::TickerNotFound(_) => IssueKind::NotFound,
        EngineError::Network(_) => IssueKind::Network,
        _ => IssueKind::Parse,
    }
}

/// Merges rows into a `(ticker, period_end)` keyed accumulator; on a key
/// collision the latest `asof_date` wins.
fn merge_rows<R: TableRow>(acc: &mut HashMap<(Ticker, NaiveDate), R>, rows: Vec<R>) {
    for row in rows {
        let key = (row.ticker().clone(), row.period_end());
        match acc.entry(key) {
            Entry::Occupied(mut existing) => {
                if row.asof_date() >= existing.get().asof_date() {
                    existing.insert(row);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }
}

/// Drains an accumulator into a deterministically ordered table.
fn sorted_rows<R: TableRow>(acc: HashMap<(Ticker, NaiveDate), R>) -> Vec<R> {
    let mut rows: Vec<R> = acc.into_values().collect();
    rows.sort_by(|a, b| {
        a.ticker()
            .cmp(b.ticker())
            .then_with(|| a.period_end().cmp(&b.period_end()))
    });
    rows
}
