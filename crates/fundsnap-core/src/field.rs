//! Standard statement field enumeration.
//!
//! [`StandardField`] is the closed set of canonical line items that every
//! source must map into. The set is fixed per schema version; extending it
//! is a schema change, not a runtime concern.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which financial statement a field belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementType {
    /// Income statement.
    Income,
    /// Balance sheet.
    Balance,
    /// Cash flow statement.
    Cashflow,
}

/// A canonical statement line item.
///
/// Every ingestion path resolves regulator-specific tags into these fields;
/// downstream consumers only ever see this closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum StandardField {
    // Income statement
    Revenue,
    CostOfRevenue,
    GrossProfit,
    OperatingExpenses,
    Ebit,
    Ebitda,
    InterestExpense,
    PretaxIncome,
    IncomeTaxExpense,
    NetIncome,
    EpsBasic,
    EpsDiluted,
    SharesBasic,
    SharesDiluted,
    // Balance sheet
    CashAndEquivalents,
    ShortTermInvestments,
    AccountsReceivable,
    Inventory,
    CurrentAssets,
    PpeNet,
    Goodwill,
    Intangibles,
    TotalAssets,
    AccountsPayable,
    ShortTermDebt,
    CurrentLiabilities,
    LongTermDebt,
    TotalLiabilities,
    CommonEquity,
    RetainedEarnings,
    TotalEquity,
    // Cash flow statement
    Cfo,
    Capex,
    Cfi,
    Cff,
    DividendsPaid,
    ShareRepurchases,
    NetChangeInCash,
    DepreciationAmortization,
    StockBasedCompensation,
}

impl StandardField {
    /// Returns the snake_case column name used in output tables.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::CostOfRevenue => "cost_of_revenue",
            Self::GrossProfit => "gross_profit",
            Self::OperatingExpenses => "operating_expenses",
            Self::Ebit => "ebit",
            Self::Ebitda => "ebitda",
            Self::InterestExpense => "interest_expense",
            Self::PretaxIncome => "pretax_income",
            Self::IncomeTaxExpense => "income_tax_expense",
            Self::NetIncome => "net_income",
            Self::EpsBasic => "eps_basic",
            Self::EpsDiluted => "eps_diluted",
            Self::SharesBasic => "shares_basic",
            Self::SharesDiluted => "shares_diluted",
            Self::CashAndEquivalents => "cash_and_equivalents",
            Self::ShortTermInvestments => "short_term_investments",
            Self::AccountsReceivable => "accounts_receivable",
            Self::Inventory => "inventory",
            Self::CurrentAssets => "current_assets",
            Self::PpeNet => "ppe_net",
            Self::Goodwill => "goodwill",
            Self::Intangibles => "intangibles",
            Self::TotalAssets => "total_assets",
            Self::AccountsPayable => "accounts_payable",
            Self::ShortTermDebt => "short_term_debt",
            Self::CurrentLiabilities => "current_liabilities",
            Self::LongTermDebt => "long_term_debt",
            Self::TotalLiabilities => "total_liabilities",
            Self::CommonEquity => "common_equity",
            Self::RetainedEarnings => "retained_earnings",
            Self::TotalEquity => "total_equity",
            Self::Cfo => "cfo",
            Self::Capex => "capex",
            Self::Cfi => "cfi",
            Self::Cff => "cff",
            Self::DividendsPaid => "dividends_paid",
            Self::ShareRepurchases => "share_repurchases",
            Self::NetChangeInCash => "net_change_in_cash",
            Self::DepreciationAmortization => "depreciation_amortization",
            Self::StockBasedCompensation => "stock_based_compensation",
        }
    }

    /// Returns the statement this field belongs to.
    #[must_use]
    pub const fn statement(&self) -> StatementType {
        match self {
            Self::Revenue
            | Self::CostOfRevenue
            | Self::GrossProfit
            | Self::OperatingExpenses
            | Self::Ebit
            | Self::Ebitda
            | Self::InterestExpense
            | Self::PretaxIncome
            | Self::IncomeTaxExpense
            | Self::NetIncome
            | Self::EpsBasic
            | Self::EpsDiluted
            | Self::SharesBasic
            | Self::SharesDiluted => StatementType::Income,
            Self::CashAndEquivalents
            | Self::ShortTermInvestments
            | Self::AccountsReceivable
            | Self::Inventory
            | Self::CurrentAssets
            | Self::PpeNet
            | Self::Goodwill
            | Self::Intangibles
            | Self::TotalAssets
            | Self::AccountsPayable
            | Self::ShortTermDebt
            | Self::CurrentLiabilities
            | Self::LongTermDebt
            | Self::TotalLiabilities
            | Self::CommonEquity
            | Self::RetainedEarnings
            | Self::TotalEquity => StatementType::Balance,
            Self::Cfo
            | Self::Capex
            | Self::Cfi
            | Self::Cff
            | Self::DividendsPaid
            | Self::ShareRepurchases
            | Self::NetChangeInCash
            | Self::DepreciationAmortization
            | Self::StockBasedCompensation => StatementType::Cashflow,
        }
    }
}

impl fmt::Display for StandardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_are_snake_case() {
        assert_eq!(StandardField::Revenue.as_str(), "revenue");
        assert_eq!(StandardField::CostOfRevenue.as_str(), "cost_of_revenue");
        assert_eq!(StandardField::Cfo.as_str(), "cfo");
    }

    #[test]
    fn statement_classification() {
        assert_eq!(StandardField::Revenue.statement(), StatementType::Income);
        assert_eq!(
            StandardField::TotalAssets.statement(),
            StatementType::Balance
        );
        assert_eq!(StandardField::Capex.statement(), StatementType::Cashflow);
    }
}
