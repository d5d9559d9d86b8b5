//! Statement row assembly from resolved facts.
//!
//! For one ticker and one selected filing, [`StatementAssembler`] projects
//! the fact store through the tag mapper into one typed row per statement
//! table. Missing fields stay `None`: never zero, never forward-filled.

use chrono::NaiveDate;
use tracing::debug;

use fundsnap_core::field::StandardField;
use fundsnap_core::period::PeriodType;
use fundsnap_core::types::{BalanceRow, CashflowRow, Cik, DerivedRow, Filing, IncomeRow, Ticker};

use crate::facts::FactStore;
use crate::mapper::resolve_field;

/// Division that propagates missing values and refuses zero denominators.
fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d.abs() > 0.0 => Some(n / d),
        _ => None,
    }
}

/// Assembles standardized statement rows for one ticker.
#[derive(Clone, Debug)]
pub struct StatementAssembler {
    ticker: Ticker,
    cik: Cik,
}

impl StatementAssembler {
    /// Creates an assembler for one ticker/issuer pair.
    #[must_use]
    pub const fn new(ticker: Ticker, cik: Cik) -> Self {
        Self { ticker, cik }
    }

    /// Builds the income statement row for one filing's fiscal period.
    ///
    /// Returns `None` when no income fact resolved at all.
    #[must_use]
    pub fn income_row(
        &self,
        store: &FactStore,
        filing: &Filing,
        period_type: PeriodType,
        cutoff: NaiveDate,
    ) -> Option<IncomeRow> {
        let target = filing.period_end;
        let resolve = |field| resolve_field(store, field, target, period_type, cutoff);

        let mut row = IncomeRow::new(
            self.ticker.clone(),
            self.cik.clone(),
            filing.accession.clone(),
            filing.acceptance_datetime.date(),
            target,
        );
        row.revenue = resolve(StandardField::Revenue);
        row.cost_of_revenue = resolve(StandardField::CostOfRevenue);
        row.gross_profit = resolve(StandardField::GrossProfit);
        row.operating_expenses = resolve(StandardField::OperatingExpenses);
        row.ebit = resolve(StandardField::Ebit);
        row.ebitda = resolve(StandardField::Ebitda);
        row.interest_expense = resolve(StandardField::InterestExpense);
        row.pretax_income = resolve(StandardField::PretaxIncome);
        row.income_tax_expense = resolve(StandardField::IncomeTaxExpense);
        row.net_income = resolve(StandardField::NetIncome);
        row.eps_basic = resolve(StandardField::EpsBasic);
        row.eps_diluted = resolve(StandardField::EpsDiluted);
        row.shares_basic = resolve(StandardField::SharesBasic);
        row.shares_diluted = resolve(StandardField::SharesDiluted);

        // Few issuers tag EBITDA explicitly; EBIT + D&A covers the rest.
        if row.ebitda.is_none() {
            if let (Some(ebit), Some(da)) =
                (row.ebit, resolve(StandardField::DepreciationAmortization))
            {
                row.ebitda = Some(ebit + da);
            }
        }

        if row.is_empty() {
            debug!(ticker = %self.ticker, accession = %filing.accession, %target,
                   "no income facts resolved");
            return None;
        }
        Some(row)
    }

    /// Builds the balance sheet row for one filing's fiscal period.
    #[must_use]
    pub fn balance_row(
        &self,
        store: &FactStore,
        filing: &Filing,
        period_type: PeriodType,
        cutoff: NaiveDate,
    ) -> Option<BalanceRow> {
        let target = filing.period_end;
        let resolve = |field| resolve_field(store, field, target, period_type, cutoff);

        let mut row = BalanceRow::new(
            self.ticker.clone(),
            self.cik.clone(),
            filing.accession.clone(),
            filing.acceptance_datetime.date(),
            target,
        );
        row.cash_and_equivalents = resolve(StandardField::CashAndEquivalents);
        row.short_term_investments = resolve(StandardField::ShortTermInvestments);
        row.accounts_receivable = resolve(StandardField::AccountsReceivable);
        row.inventory = resolve(StandardField::Inventory);
        row.current_assets = resolve(StandardField::CurrentAssets);
        row.ppe_net = resolve(StandardField::PpeNet);
        row.goodwill = resolve(StandardField::Goodwill);
        row.intangibles = resolve(StandardField::Intangibles);
        row.total_assets = resolve(StandardField::TotalAssets);
        row.accounts_payable = resolve(StandardField::AccountsPayable);
        row.short_term_debt = resolve(StandardField::ShortTermDebt);
        row.current_liabilities = resolve(StandardField::CurrentLiabilities);
        row.long_term_debt = resolve(StandardField::LongTermDebt);
        row.total_liabilities = resolve(StandardField::TotalLiabilities);
        row.common_equity = resolve(StandardField::CommonEquity);
        row.retained_earnings = resolve(StandardField::RetainedEarnings);
        row.total_equity = resolve(StandardField::TotalEquity);

        // Complete one missing leg of Assets = Liabilities + Equity from the
        // other two.
        match (row.total_assets, row.total_liabilities, row.total_equity) {
            (None, Some(liabilities), Some(equity)) => {
                row.total_assets = Some(liabilities + equity);
            }
            (Some(assets), None, Some(equity)) => {
                row.total_liabilities = Some(assets - equity);
            }
            (Some(assets), Some(liabilities), None) => {
                row.total_equity = Some(assets - liabilities);
            }
            _ => {}
        }

        if row.is_empty() {
            debug!(ticker = %self.ticker, accession = %filing.accession, %target,
                   "no balance facts resolved");
            return None;
        }
        Some(row)
    }

    /// Builds the cash flow row for one filing's fiscal period.
    #[must_use]
    pub fn cashflow_row(
        &self,
        store: &FactStore,
        filing: &Filing,
        period_type: PeriodType,
        cutoff: NaiveDate,
    ) -> Option<CashflowRow> {
        let target = filing.period_end;
        let resolve = |field| resolve_field(store, field, target, period_type, cutoff);

        let mut row = CashflowRow::new(
            self.ticker.clone(),
            self.cik.clone(),
            filing.accession.clone(),
            filing.acceptance_datetime.date(),
            target,
        );
        row.cfo = resolve(StandardField::Cfo);
        row.capex = resolve(StandardField::Capex);
        row.cfi = resolve(StandardField::Cfi);
        row.cff = resolve(StandardField::Cff);
        row.dividends_paid = resolve(StandardField::DividendsPaid);
        row.share_repurchases = resolve(StandardField::ShareRepurchases);
        row.net_change_in_cash = resolve(StandardField::NetChangeInCash);
        row.depreciation_amortization = resolve(StandardField::DepreciationAmortization);
        row.stock_based_compensation = resolve(StandardField::StockBasedCompensation);

        // capex is stored positive, so FCF is a plain difference
        if let (Some(cfo), Some(capex)) = (row.cfo, row.capex) {
            row.free_cash_flow = Some(cfo - capex);
        }

        if row.is_empty() {
            debug!(ticker = %self.ticker, accession = %filing.accession, %target,
                   "no cashflow facts resolved");
            return None;
        }
        Some(row)
    }

    /// Computes derived metrics from the already-assembled rows for one
    /// period. Every metric propagates null inputs; nothing is re-resolved
    /// from facts.
    #[must_use]
    pub fn derived_row(
        &self,
        income: Option<&IncomeRow>,
        balance: Option<&BalanceRow>,
        filing: &Filing,
    ) -> Option<DerivedRow> {
        if income.is_none() && balance.is_none() {
            return None;
        }

        let mut row = DerivedRow::new(
            self.ticker.clone(),
            self.cik.clone(),
            filing.accession.clone(),
            filing.acceptance_datetime.date(),
            filing.period_end,
        );

        let revenue = income.and_then(|r| r.revenue);
        let gross_profit = income.and_then(|r| r.gross_profit);
        let ebit = income.and_then(|r| r.ebit);
        let net_income = income.and_then(|r| r.net_income);

        row.gross_margin = safe_div(gross_profit, revenue);
        row.ebit_margin = safe_div(ebit, revenue);
        row.net_margin = safe_div(net_income, revenue);

        let total_assets = balance.and_then(|r| r.total_assets);
        let total_equity = balance.and_then(|r| r.total_equity);
        let current_assets = balance.and_then(|r| r.current_assets);
        let current_liabilities = balance.and_then(|r| r.current_liabilities);
        let long_term_debt = balance.and_then(|r| r.long_term_debt);
        let short_term_debt = balance.and_then(|r| r.short_term_debt);
        let cash = balance.and_then(|r| r.cash_and_equivalents);

        row.roa = safe_div(net_income, total_assets);
        row.roe = safe_div(net_income, total_equity);
        row.current_ratio = safe_div(current_assets, current_liabilities);
        row.quick_ratio = safe_div(
            match (current_assets, balance.and_then(|r| r.inventory)) {
                (Some(ca), Some(inv)) => Some(ca - inv),
                (Some(ca), None) => Some(ca),
                _ => None,
            },
            current_liabilities,
        );
        row.debt_to_equity = safe_div(long_term_debt, total_equity);
        row.net_debt = match (long_term_debt, short_term_debt, cash) {
            (None, None, _) => None,
            (ltd, std_, c) => {
                Some(ltd.unwrap_or(0.0) + std_.unwrap_or(0.0) - c.unwrap_or(0.0))
            }
        };
        // roic and fcf_yield need data outside the statement schema

        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundsnap_core::types::{FormType, XbrlFact};
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn filing() -> Filing {
        Filing::new(
            Cik::new("320193"),
            Ticker::new("AAPL"),
            "0000320193-23-000006",
            FormType::AnnualReport,
            d(2022, 10, 28),
            d(2022, 10, 28).and_hms_opt(6, 1, 14).unwrap(),
            d(2022, 9, 24),
        )
        .unwrap()
    }

    fn duration(tag: &str, value: f64) -> XbrlFact {
        XbrlFact {
            tag: tag.into(),
            value,
            unit: "USD".into(),
            start: Some(d(2021, 9, 26)),
            end: d(2022, 9, 24),
            accession: "0000320193-23-000006".into(),
            form: "10-K".into(),
            frame: None,
            dimensions: BTreeMap::new(),
            filed: d(2022, 10, 28),
        }
    }

    fn instant(tag: &str, value: f64) -> XbrlFact {
        let mut fact = duration(tag, value);
        fact.start = None;
        fact
    }

    fn store() -> FactStore {
        let mut store = FactStore::default();
        store.insert(duration("us-gaap:Revenues", 1_000.0));
        store.insert(duration("us-gaap:CostOfRevenue", 600.0));
        store.insert(duration("us-gaap:GrossProfit", 400.0));
        store.insert(duration("us-gaap:OperatingIncomeLoss", 250.0));
        store.insert(duration("us-gaap:NetIncomeLoss", 200.0));
        store.insert(duration("us-gaap:DepreciationDepletionAndAmortization", 50.0));
        store.insert(instant("us-gaap:Assets", 2_000.0));
        store.insert(instant("us-gaap:Liabilities", 1_200.0));
        store.insert(instant("us-gaap:StockholdersEquity", 800.0));
        store.insert(instant("us-gaap:AssetsCurrent", 900.0));
        store.insert(instant("us-gaap:LiabilitiesCurrent", 450.0));
        store.insert(instant("us-gaap:InventoryNet", 100.0));
        store.insert(instant("us-gaap:CashAndCashEquivalentsAtCarryingValue", 300.0));
        store.insert(instant("us-gaap:LongTermDebtNoncurrent", 400.0));
        store.insert(duration(
            "us-gaap:NetCashProvidedByUsedInOperatingActivities",
            280.0,
        ));
        store.insert(duration(
            "us-gaap:PaymentsToAcquirePropertyPlantAndEquipment",
            -80.0,
        ));
        store
    }

    fn assembler() -> StatementAssembler {
        StatementAssembler::new(Ticker::new("AAPL"), Cik::new("320193"))
    }

    #[test]
    fn income_row_projects_fields_and_provenance() {
        let filing = filing();
        let row = assembler()
            .income_row(&store(), &filing, PeriodType::Annual, d(2022, 12, 31))
            .unwrap();

        assert_eq!(row.revenue, Some(1_000.0));
        assert_eq!(row.net_income, Some(200.0));
        assert_eq!(row.accession, filing.accession);
        assert_eq!(row.asof_date, d(2022, 10, 28));
        assert_eq!(row.period_end, d(2022, 9, 24));
        // Missing fields stay empty
        assert_eq!(row.interest_expense, None);
    }

    #[test]
    fn ebitda_falls_back_to_ebit_plus_da() {
        let row = assembler()
            .income_row(&store(), &filing(), PeriodType::Annual, d(2022, 12, 31))
            .unwrap();
        assert_eq!(row.ebitda, Some(300.0));
    }

    #[test]
    fn balance_row_projects_instant_facts() {
        let row = assembler()
            .balance_row(&store(), &filing(), PeriodType::Annual, d(2022, 12, 31))
            .unwrap();
        assert_eq!(row.total_assets, Some(2_000.0));
        assert_eq!(row.total_liabilities, Some(1_200.0));
        assert_eq!(row.total_equity, Some(800.0));
        assert_eq!(row.goodwill, None);
    }

    #[test]
    fn balance_identity_completes_missing_equity() {
        let mut store = FactStore::default();
        store.insert(instant("us-gaap:Assets", 2_000.0));
        store.insert(instant("us-gaap:Liabilities", 1_200.0));

        let row = assembler()
            .balance_row(&store, &filing(), PeriodType::Annual, d(2022, 12, 31))
            .unwrap();
        assert_eq!(row.total_equity, Some(800.0));
    }

    #[test]
    fn cashflow_row_computes_fcf_from_positive_capex() {
        let row = assembler()
            .cashflow_row(&store(), &filing(), PeriodType::Annual, d(2022, 12, 31))
            .unwrap();
        assert_eq!(row.cfo, Some(280.0));
        assert_eq!(row.capex, Some(80.0));
        assert_eq!(row.free_cash_flow, Some(200.0));
    }

    #[test]
    fn empty_store_yields_no_rows() {
        let store = FactStore::default();
        let a = assembler();
        let filing = filing();
        assert!(
            a.income_row(&store, &filing, PeriodType::Annual, d(2022, 12, 31))
                .is_none()
        );
        assert!(
            a.balance_row(&store, &filing, PeriodType::Annual, d(2022, 12, 31))
                .is_none()
        );
        assert!(
            a.cashflow_row(&store, &filing, PeriodType::Annual, d(2022, 12, 31))
                .is_none()
        );
    }

    #[test]
    fn cutoff_hides_facts_filed_later() {
        // The filing's facts were filed 2022-10-28; a cutoff before that
        // resolves nothing even though the filing metadata is visible.
        let row = assembler().income_row(&store(), &filing(), PeriodType::Annual, d(2022, 10, 1));
        assert!(row.is_none());
    }

    #[test]
    fn derived_metrics_from_assembled_rows() {
        let a = assembler();
        let filing = filing();
        let income = a
            .income_row(&store(), &filing, PeriodType::Annual, d(2022, 12, 31))
            .unwrap();
        let balance = a
            .balance_row(&store(), &filing, PeriodType::Annual, d(2022, 12, 31))
            .unwrap();

        let row = a
            .derived_row(Some(&income), Some(&balance), &filing)
            .unwrap();
        assert_eq!(row.gross_margin, Some(0.4));
        assert_eq!(row.ebit_margin, Some(0.25));
        assert_eq!(row.net_margin, Some(0.2));
        assert_eq!(row.roa, Some(0.1));
        assert_eq!(row.roe, Some(0.25));
        assert_eq!(row.current_ratio, Some(2.0));
        assert_eq!(row.quick_ratio, Some((900.0 - 100.0) / 450.0));
        assert_eq!(row.debt_to_equity, Some(0.5));
        assert_eq!(row.net_debt, Some(400.0 - 300.0));
        // Needs market/capital data not in the schema
        assert_eq!(row.roic, None);
        assert_eq!(row.fcf_yield, None);
    }

    #[test]
    fn derived_metrics_propagate_nulls() {
        let a = assembler();
        let filing = filing();
        let balance = a
            .balance_row(&store(), &filing, PeriodType::Annual, d(2022, 12, 31))
            .unwrap();

        let row = a.derived_row(None, Some(&balance), &filing).unwrap();
        assert_eq!(row.gross_margin, None);
        assert_eq!(row.roa, None);
        assert_eq!(row.current_ratio, Some(2.0));

        assert!(a.derived_row(None, None, &filing).is_none());
    }
}
