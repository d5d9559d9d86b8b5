//! Core data types for point-in-time fundamental snapshots.
//!
//! This module defines the domain model:
//!
//! - [`Ticker`] / [`Cik`] - equity and issuer identifiers
//! - [`Filing`] - one regulatory filing with its acceptance timestamp
//! - [`XbrlFact`] - one tagged value extracted from company facts
//! - [`SnapshotRequest`] / [`SnapshotResult`] - the build surface
//! - Row types for each output table and [`SnapshotTables`]
//! - [`CoverageReport`] - the authoritative failure surface

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, Result};
use crate::period::{PeriodKind, PeriodType};

/// An equity ticker.
///
/// Tickers are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ticker {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A regulator-assigned issuer identifier (SEC CIK).
///
/// Stored as a zero-padded 10-digit string, the form the regulator's API
/// endpoints expect. Unique per issuer across time, including delisted and
/// merged entities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cik(String);

impl Cik {
    /// Creates a CIK, zero-padding to 10 digits.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(format!("{:0>10}", s.into().trim()))
    }

    /// Creates a CIK from the integer form the registry JSON uses.
    #[must_use]
    pub fn from_u64(n: u64) -> Self {
        Self(format!("{n:010}"))
    }

    /// Returns the zero-padded CIK string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the CIK as an integer (URL templates use the unpadded form).
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0.parse().unwrap_or(0)
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classified regulatory form type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormType {
    /// Annual report (10-K, 10-KT).
    AnnualReport,
    /// Amendment to an annual report (10-K/A, 10-KT/A).
    AnnualAmendment,
    /// Quarterly report (10-Q).
    QuarterlyReport,
    /// Amendment to a quarterly report (10-Q/A).
    QuarterlyAmendment,
    /// Any other form (8-K, proxies, ...), kept verbatim.
    Other(String),
}

impl FormType {
    /// Classifies a raw SEC form string.
    #[must_use]
    pub fn from_sec(form: &str) -> Self {
        match form.trim() {
            "10-K" | "10-KT" => Self::AnnualReport,
            "10-K/A" | "10-KT/A" => Self::AnnualAmendment,
            "10-Q" => Self::QuarterlyReport,
            "10-Q/A" => Self::QuarterlyAmendment,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true for amendment forms (10-K/A, 10-Q/A).
    #[must_use]
    pub const fn is_amendment(&self) -> bool {
        matches!(self, Self::AnnualAmendment | Self::QuarterlyAmendment)
    }

    /// Returns true if this form reports the requested period type.
    /// Amendments count toward the period type they restate.
    #[must_use]
    pub const fn matches(&self, period_type: PeriodType) -> bool {
        match period_type {
            PeriodType::Annual => matches!(self, Self::AnnualReport | Self::AnnualAmendment),
            PeriodType::Quarterly => {
                matches!(self, Self::QuarterlyReport | Self::QuarterlyAmendment)
            }
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AnnualReport => "10-K",
            Self::AnnualAmendment => "10-K/A",
            Self::QuarterlyReport => "10-Q",
            Self::QuarterlyAmendment => "10-Q/A",
            Self::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

/// One regulatory filing.
///
/// `acceptance_datetime` is the sole point-in-time availability gate: it is
/// the second-granular timestamp at which the regulator received the filing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    /// Issuer identifier.
    pub cik: Cik,
    /// Equity ticker (resolution context; used in logs and coverage).
    pub ticker: Ticker,
    /// Accession number, e.g. `0000320193-17-000009`.
    pub accession: String,
    /// Classified form type.
    pub form_type: FormType,
    /// Date the filing appeared on the regulator's site.
    pub filing_date: NaiveDate,
    /// Precise timestamp the regulator accepted the filing.
    pub acceptance_datetime: NaiveDateTime,
    /// Fiscal period end the filing reports on.
    pub period_end: NaiveDate,
}

impl Filing {
    /// Creates a filing, enforcing `period_end <= filing_date` and
    /// `filing_date <= acceptance date`. Violations are parse errors:
    /// a filing index that breaks this ordering is corrupt.
    pub fn new(
        cik: Cik,
        ticker: Ticker,
        accession: impl Into<String>,
        form_type: FormType,
        filing_date: NaiveDate,
        acceptance_datetime: NaiveDateTime,
        period_end: NaiveDate,
    ) -> Result<Self> {
        let accession = accession.into();
        if period_end > filing_date {
            return Err(EngineError::Parse(format!(
                "filing {accession}: period_end {period_end} is after filing_date {filing_date}"
            )));
        }
        if filing_date > acceptance_datetime.date() {
            return Err(EngineError::Parse(format!(
                "filing {accession}: filing_date {filing_date} is after acceptance \
                 {acceptance_datetime}"
            )));
        }
        Ok(Self {
            cik,
            ticker,
            accession,
            form_type,
            filing_date,
            acceptance_datetime,
            period_end,
        })
    }
}

/// Axis members that still describe the whole entity rather than a segment
/// slice. Domain defaults (`*Domain`) on an axis equal the consolidated total.
const WHOLE_ENTITY_MEMBERS: &[&str] = &["srt:ConsolidatedEntitiesDomain"];

/// One tagged value extracted from the regulator's company facts.
///
/// Facts are immutable. The same logical value reported in an original
/// filing and again in a restatement is two distinct facts, distinguished
/// by `accession` and `filed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XbrlFact {
    /// Fully-qualified tag, e.g. `us-gaap:Revenues`.
    pub tag: String,
    /// Numeric value.
    pub value: f64,
    /// Unit string (`USD`, `shares`, `pure`, ...).
    pub unit: String,
    /// Period start for duration facts; `None` for instants.
    pub start: Option<NaiveDate>,
    /// Period end (or instant date).
    pub end: NaiveDate,
    /// Accession number of the filing this fact belongs to.
    pub accession: String,
    /// Form type string attached to this fact (`10-K`, `10-K/A`, ...).
    pub form: String,
    /// Calendar frame label when the regulator assigned one (`CY2022`).
    pub frame: Option<String>,
    /// Segment axis → member slicing; empty for whole-entity facts.
    pub dimensions: BTreeMap<String, String>,
    /// Date the owning filing was filed.
    pub filed: NaiveDate,
}

impl XbrlFact {
    /// Returns the temporal shape of this fact.
    #[must_use]
    pub const fn period_kind(&self) -> PeriodKind {
        if self.start.is_none() {
            PeriodKind::Instant
        } else {
            PeriodKind::Duration
        }
    }

    /// Returns true if this fact describes the consolidated entity.
    ///
    /// A fact is consolidated when it carries no segment dimensions, or when
    /// every member on its axes is a whole-entity ("total") member.
    #[must_use]
    pub fn is_consolidated(&self) -> bool {
        self.dimensions.is_empty()
            || self
                .dimensions
                .values()
                .all(|m| WHOLE_ENTITY_MEMBERS.contains(&m.as_str()) || m.ends_with("Domain"))
    }

    /// Returns true if the fact came from an amendment filing.
    #[must_use]
    pub fn from_amendment(&self) -> bool {
        self.form.ends_with("/A")
    }
}

/// Describes what data to pull and as of when.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    /// Tickers to include.
    pub tickers: Vec<Ticker>,
    /// Knowledge cutoff: only filings accepted by the end of this day are used.
    pub cutoff: NaiveDate,
    /// Annual or quarterly statements.
    pub period_type: PeriodType,
    /// Admit amendment filings (10-K/A, 10-Q/A) into the index.
    pub include_amendments: bool,
    /// Rolling last-twelve-months windows. Must stay false: LTM columns mix
    /// periods and break point-in-time semantics.
    pub allow_ltm: bool,
    /// Forward estimate data. Must stay false: estimates are lookahead.
    pub allow_estimates: bool,
}

impl SnapshotRequest {
    /// Creates a request with default options (annual, amendments included).
    #[must_use]
    pub fn new(tickers: Vec<Ticker>, cutoff: NaiveDate) -> Self {
        Self {
            tickers,
            cutoff,
            period_type: PeriodType::Annual,
            include_amendments: true,
            allow_ltm: false,
            allow_estimates: false,
        }
    }

    /// Sets the period type.
    #[must_use]
    pub fn with_period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = period_type;
        self
    }

    /// Sets whether amendments are admitted.
    #[must_use]
    pub fn with_amendments(mut self, include: bool) -> Self {
        self.include_amendments = include;
        self
    }

    /// Rejects configurations that would introduce lookahead bias.
    pub fn validate(&self) -> Result<()> {
        if self.allow_estimates {
            return Err(EngineError::InvalidRequest(
                "allow_estimates=true is not permitted: estimate data is forward-looking".into(),
            ));
        }
        if self.allow_ltm {
            return Err(EngineError::InvalidRequest(
                "allow_ltm=true is not permitted: rolling windows are excluded from snapshots"
                    .into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

/// Common accessors for rows that participate in the `(ticker, period_end)`
/// keyed merge, where the latest `asof_date` wins.
pub trait TableRow {
    /// The ticker this row belongs to.
    fn ticker(&self) -> &Ticker;
    /// Fiscal period end.
    fn period_end(&self) -> NaiveDate;
    /// Acceptance date of the filing that produced this row.
    fn asof_date(&self) -> NaiveDate;
}

macro_rules! impl_table_row {
    ($row:ty) => {
        impl TableRow for $row {
            fn ticker(&self) -> &Ticker {
                &self.ticker
            }
            fn period_end(&self) -> NaiveDate {
                self.period_end
            }
            fn asof_date(&self) -> NaiveDate {
                self.asof_date
            }
        }
    };
}

/// One row of the `company_master` table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRow {
    /// Equity ticker.
    pub ticker: Ticker,
    /// Issuer identifier.
    pub cik: Cik,
    /// Registry company name.
    pub company_name: String,
    /// SIC industry code, when known.
    pub sic: Option<String>,
    /// Primary exchange, when known.
    pub exchange: Option<String>,
}

/// One row of the `filings` table: a filing selected for the snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilingRow {
    /// Equity ticker.
    pub ticker: Ticker,
    /// Issuer identifier.
    pub cik: Cik,
    /// Accession number.
    pub accession: String,
    /// Raw form type string.
    pub form_type: String,
    /// Filing date.
    pub filing_date: NaiveDate,
    /// Acceptance timestamp (the availability gate).
    pub acceptance_datetime: NaiveDateTime,
    /// Fiscal period end.
    pub period_end: NaiveDate,
}

impl FilingRow {
    /// Builds a table row from a selected filing.
    #[must_use]
    pub fn from_filing(filing: &Filing) -> Self {
        Self {
            ticker: filing.ticker.clone(),
            cik: filing.cik.clone(),
            accession: filing.accession.clone(),
            form_type: filing.form_type.to_string(),
            filing_date: filing.filing_date,
            acceptance_datetime: filing.acceptance_datetime,
            period_end: filing.period_end,
        }
    }
}

/// One row of the `statements_income` table.
///
/// Missing line items stay `None`: never zero, never forward-filled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct IncomeRow {
    pub ticker: Ticker,
    pub cik: Cik,
    pub accession: String,
    /// Acceptance date of the source filing.
    pub asof_date: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue: Option<f64>,
    pub cost_of_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub ebit: Option<f64>,
    pub ebitda: Option<f64>,
    pub interest_expense: Option<f64>,
    pub pretax_income: Option<f64>,
    pub income_tax_expense: Option<f64>,
    pub net_income: Option<f64>,
    pub eps_basic: Option<f64>,
    pub eps_diluted: Option<f64>,
    pub shares_basic: Option<f64>,
    pub shares_diluted: Option<f64>,
}

impl IncomeRow {
    /// Creates a row with identity columns set and all line items empty.
    #[must_use]
    pub fn new(
        ticker: Ticker,
        cik: Cik,
        accession: impl Into<String>,
        asof_date: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            ticker,
            cik,
            accession: accession.into(),
            asof_date,
            period_end,
            ..Default::default()
        }
    }

    /// Returns true if no line item was populated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.revenue.is_none()
            && self.cost_of_revenue.is_none()
            && self.gross_profit.is_none()
            && self.operating_expenses.is_none()
            && self.ebit.is_none()
            && self.ebitda.is_none()
            && self.interest_expense.is_none()
            && self.pretax_income.is_none()
            && self.income_tax_expense.is_none()
            && self.net_income.is_none()
            && self.eps_basic.is_none()
            && self.eps_diluted.is_none()
            && self.shares_basic.is_none()
            && self.shares_diluted.is_none()
    }
}

impl_table_row!(IncomeRow);

/// One row of the `statements_balance` table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BalanceRow {
    pub ticker: Ticker,
    pub cik: Cik,
    pub accession: String,
    /// Acceptance date of the source filing.
    pub asof_date: NaiveDate,
    pub period_end: NaiveDate,
    pub cash_and_equivalents: Option<f64>,
    pub short_term_investments: Option<f64>,
    pub accounts_receivable: Option<f64>,
    pub inventory: Option<f64>,
    pub current_assets: Option<f64>,
    pub ppe_net: Option<f64>,
    pub goodwill: Option<f64>,
    pub intangibles: Option<f64>,
    pub total_assets: Option<f64>,
    pub accounts_payable: Option<f64>,
    pub short_term_debt: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub common_equity: Option<f64>,
    pub retained_earnings: Option<f64>,
    pub total_equity: Option<f64>,
    /// Set by the validation pass: assets ≈ liabilities + equity within 1%.
    pub identity_ok: Option<bool>,
}

impl BalanceRow {
    /// Creates a row with identity columns set and all line items empty.
    #[must_use]
    pub fn new(
        ticker: Ticker,
        cik: Cik,
        accession: impl Into<String>,
        asof_date: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            ticker,
            cik,
            accession: accession.into(),
            asof_date,
            period_end,
            ..Default::default()
        }
    }

    /// Returns true if no line item was populated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cash_and_equivalents.is_none()
            && self.short_term_investments.is_none()
            && self.accounts_receivable.is_none()
            && self.inventory.is_none()
            && self.current_assets.is_none()
            && self.ppe_net.is_none()
            && self.goodwill.is_none()
            && self.intangibles.is_none()
            && self.total_assets.is_none()
            && self.accounts_payable.is_none()
            && self.short_term_debt.is_none()
            && self.current_liabilities.is_none()
            && self.long_term_debt.is_none()
            && self.total_liabilities.is_none()
            && self.common_equity.is_none()
            && self.retained_earnings.is_none()
            && self.total_equity.is_none()
    }
}

impl_table_row!(BalanceRow);

/// One row of the `statements_cashflow` table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CashflowRow {
    pub ticker: Ticker,
    pub cik: Cik,
    pub accession: String,
    /// Acceptance date of the source filing.
    pub asof_date: NaiveDate,
    pub period_end: NaiveDate,
    pub cfo: Option<f64>,
    /// Stored positive (reported as a negative outflow in filings).
    pub capex: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub cfi: Option<f64>,
    pub cff: Option<f64>,
    /// Stored positive.
    pub dividends_paid: Option<f64>,
    /// Stored positive.
    pub share_repurchases: Option<f64>,
    pub net_change_in_cash: Option<f64>,
    pub depreciation_amortization: Option<f64>,
    pub stock_based_compensation: Option<f64>,
    /// Set by the validation pass: cfo + cfi + cff ≈ net change in cash.
    pub reconciles: Option<bool>,
}

impl CashflowRow {
    /// Creates a row with identity columns set and all line items empty.
    #[must_use]
    pub fn new(
        ticker: Ticker,
        cik: Cik,
        accession: impl Into<String>,
        asof_date: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            ticker,
            cik,
            accession: accession.into(),
            asof_date,
            period_end,
            ..Default::default()
        }
    }

    /// Returns true if no line item was populated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cfo.is_none()
            && self.capex.is_none()
            && self.free_cash_flow.is_none()
            && self.cfi.is_none()
            && self.cff.is_none()
            && self.dividends_paid.is_none()
            && self.share_repurchases.is_none()
            && self.net_change_in_cash.is_none()
            && self.depreciation_amortization.is_none()
            && self.stock_based_compensation.is_none()
    }
}

impl_table_row!(CashflowRow);

/// One row of the `derived_metrics` table.
///
/// Every metric is computed from already-assembled fields in the matching
/// statement rows; a null input propagates null.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct DerivedRow {
    pub ticker: Ticker,
    pub cik: Cik,
    pub accession: String,
    /// Acceptance date of the source filing.
    pub asof_date: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_margin: Option<f64>,
    pub ebit_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub roa: Option<f64>,
    pub roe: Option<f64>,
    /// Requires invested-capital detail not in the core schema; stays null.
    pub roic: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub net_debt: Option<f64>,
    /// Requires market data; stays null.
    pub fcf_yield: Option<f64>,
}

impl DerivedRow {
    /// Creates a row with identity columns set and all metrics empty.
    #[must_use]
    pub fn new(
        ticker: Ticker,
        cik: Cik,
        accession: impl Into<String>,
        asof_date: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            ticker,
            cik,
            accession: accession.into(),
            asof_date,
            period_end,
            ..Default::default()
        }
    }
}

impl_table_row!(DerivedRow);

/// The six output tables of a snapshot, as vectors of typed rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTables {
    /// Ticker → issuer master data.
    pub company_master: Vec<CompanyRow>,
    /// Filings selected for the snapshot.
    pub filings: Vec<FilingRow>,
    /// Income statement rows.
    pub statements_income: Vec<IncomeRow>,
    /// Balance sheet rows.
    pub statements_balance: Vec<BalanceRow>,
    /// Cash flow rows.
    pub statements_cashflow: Vec<CashflowRow>,
    /// Derived metric rows.
    pub derived_metrics: Vec<DerivedRow>,
}

impl SnapshotTables {
    /// Canonical table name.
    pub const COMPANY_MASTER: &'static str = "company_master";
    /// Canonical table name.
    pub const FILINGS: &'static str = "filings";
    /// Canonical table name.
    pub const STATEMENTS_INCOME: &'static str = "statements_income";
    /// Canonical table name.
    pub const STATEMENTS_BALANCE: &'static str = "statements_balance";
    /// Canonical table name.
    pub const STATEMENTS_CASHFLOW: &'static str = "statements_cashflow";
    /// Canonical table name.
    pub const DERIVED_METRICS: &'static str = "derived_metrics";

    /// Total number of rows across all tables.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.company_master.len()
            + self.filings.len()
            + self.statements_income.len()
            + self.statements_balance.len()
            + self.statements_cashflow.len()
            + self.derived_metrics.len()
    }

    /// Returns true if every table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

/// Why a ticker has incomplete or missing data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// The ticker or its data endpoint does not exist.
    NotFound,
    /// Transport failure after retries.
    Network,
    /// Malformed payload.
    Parse,
    /// Accounting identity or schema check failed (row still emitted).
    Validation,
    /// The ticker resolved but no filing passed the point-in-time gate.
    NoFilings,
}

/// One diagnostic entry in the coverage report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickerIssue {
    /// Affected ticker.
    pub ticker: Ticker,
    /// Issue classification.
    pub kind: IssueKind,
    /// Human-readable detail.
    pub detail: String,
}

/// Documents which requested tickers produced data and why others did not.
///
/// Downstream consumers use `missing_tickers` to flag (not drop) names:
/// silently dropping delisted tickers would bias any study toward survivors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Every ticker that was requested.
    pub requested: Vec<Ticker>,
    /// Tickers that produced at least one statement row.
    pub resolved: Vec<Ticker>,
    /// Tickers that produced nothing. Disjoint from `resolved`.
    pub missing_tickers: Vec<Ticker>,
    /// Per-ticker diagnostics (errors, validation flags, missing fields).
    pub issues: Vec<TickerIssue>,
    /// Number of income rows per resolved ticker.
    pub filing_counts: HashMap<Ticker, usize>,
}

impl CoverageReport {
    /// Fraction of requested tickers that produced data.
    #[must_use]
    pub fn coverage_ratio(&self) -> f64 {
        if self.requested.is_empty() {
            return 0.0;
        }
        self.resolved.len() as f64 / self.requested.len() as f64
    }
}

/// Output of a snapshot build. Immutable after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResult {
    /// The cutoff date the snapshot was built as of.
    pub cutoff: NaiveDate,
    /// The output tables.
    pub tables: SnapshotTables,
    /// Coverage and diagnostics.
    pub coverage: CoverageReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn ticker_uppercases() {
        assert_eq!(Ticker::new("aapl").as_str(), "AAPL");
        assert_eq!(Ticker::new(" msft ").as_str(), "MSFT");
    }

    #[test]
    fn cik_zero_pads() {
        assert_eq!(Cik::new("320193").as_str(), "0000320193");
        assert_eq!(Cik::from_u64(320193).as_str(), "0000320193");
        assert_eq!(Cik::new("320193").as_u64(), 320193);
    }

    #[test]
    fn form_type_classification() {
        assert_eq!(FormType::from_sec("10-K"), FormType::AnnualReport);
        assert_eq!(FormType::from_sec("10-KT"), FormType::AnnualReport);
        assert_eq!(FormType::from_sec("10-K/A"), FormType::AnnualAmendment);
        assert_eq!(FormType::from_sec("10-Q"), FormType::QuarterlyReport);
        assert_eq!(
            FormType::from_sec("8-K"),
            FormType::Other("8-K".to_string())
        );

        assert!(FormType::AnnualAmendment.is_amendment());
        assert!(!FormType::AnnualReport.is_amendment());
        assert!(FormType::AnnualAmendment.matches(PeriodType::Annual));
        assert!(!FormType::QuarterlyReport.matches(PeriodType::Annual));
    }

    fn filing(
        filing_date: NaiveDate,
        acceptance: NaiveDateTime,
        period_end: NaiveDate,
    ) -> Result<Filing> {
        Filing::new(
            Cik::new("320193"),
            Ticker::new("AAPL"),
            "0000320193-17-000009",
            FormType::AnnualReport,
            filing_date,
            acceptance,
            period_end,
        )
    }

    #[test]
    fn filing_ordering_invariant_holds() {
        let f = filing(
            d(2016, 10, 26),
            d(2016, 10, 26).and_hms_opt(16, 32, 0).unwrap(),
            d(2016, 9, 24),
        )
        .unwrap();
        assert_eq!(f.period_end, d(2016, 9, 24));
    }

    #[test]
    fn filing_rejects_period_end_after_filing_date() {
        let err = filing(
            d(2016, 10, 26),
            d(2016, 10, 26).and_hms_opt(16, 32, 0).unwrap(),
            d(2016, 11, 1),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn filing_rejects_acceptance_before_filing_date() {
        let err = filing(
            d(2016, 10, 27),
            d(2016, 10, 26).and_hms_opt(16, 32, 0).unwrap(),
            d(2016, 9, 24),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    fn fact(dimensions: BTreeMap<String, String>) -> XbrlFact {
        XbrlFact {
            tag: "us-gaap:Revenues".into(),
            value: 1_000_000.0,
            unit: "USD".into(),
            start: Some(d(2022, 1, 1)),
            end: d(2022, 12, 31),
            accession: "0001234567-23-000001".into(),
            form: "10-K".into(),
            frame: Some("CY2022".into()),
            dimensions,
            filed: d(2023, 2, 15),
        }
    }

    #[test]
    fn fact_without_dimensions_is_consolidated() {
        assert!(fact(BTreeMap::new()).is_consolidated());
    }

    #[test]
    fn fact_with_segment_member_is_not_consolidated() {
        let mut dims = BTreeMap::new();
        dims.insert(
            "us-gaap:StatementBusinessSegmentsAxis".to_string(),
            "aapl:AmericasSegmentMember".to_string(),
        );
        assert!(!fact(dims).is_consolidated());
    }

    #[test]
    fn fact_with_domain_default_is_consolidated() {
        let mut dims = BTreeMap::new();
        dims.insert(
            "srt:ConsolidatedEntitiesAxis".to_string(),
            "srt:ConsolidatedEntitiesDomain".to_string(),
        );
        assert!(fact(dims).is_consolidated());
    }

    #[test]
    fn fact_period_kind() {
        let mut f = fact(BTreeMap::new());
        assert_eq!(f.period_kind(), PeriodKind::Duration);
        f.start = None;
        assert_eq!(f.period_kind(), PeriodKind::Instant);
    }

    #[test]
    fn request_rejects_lookahead_options() {
        let mut request = SnapshotRequest::new(vec![Ticker::new("AAPL")], d(2016, 12, 31));
        assert!(request.validate().is_ok());

        request.allow_estimates = true;
        assert!(matches!(
            request.validate(),
            Err(EngineError::InvalidRequest(_))
        ));

        request.allow_estimates = false;
        request.allow_ltm = true;
        assert!(matches!(
            request.validate(),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn coverage_ratio() {
        let report = CoverageReport {
            requested: vec![Ticker::new("AAPL"), Ticker::new("MSFT")],
            resolved: vec![Ticker::new("AAPL")],
            missing_tickers: vec![Ticker::new("MSFT")],
            ..Default::default()
        };
        assert!((report.coverage_ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(CoverageReport::default().coverage_ratio(), 0.0);
    }
}
