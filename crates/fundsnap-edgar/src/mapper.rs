//! GAAP tag → standard field mapping.
//!
//! Each standard field maps to an ordered list of acceptable tags, tried in
//! priority order; the first tag with a surviving fact wins. The ordering is
//! load-bearing for reproducibility: new tag variants must be APPENDED to a
//! field's list, never inserted, so historical snapshot runs keep selecting
//! the same facts.

use chrono::NaiveDate;

use fundsnap_core::field::StandardField;
use fundsnap_core::period::{PeriodKind, PeriodType};

use crate::contexts::select_best_fact;
use crate::facts::FactStore;

/// Maps one standard field to its candidate tags.
#[derive(Debug, Clone, Copy)]
pub struct TagMapping {
    /// Target standard field.
    pub field: StandardField,
    /// Fully-qualified tags in priority order.
    pub tags: &'static [&'static str],
    /// True for items reported with a statement-local negative sign (capex,
    /// dividends); the engine stores them positive.
    pub sign_flip: bool,
    /// Expected temporal shape of matching facts.
    pub period_kind: PeriodKind,
}

/// The static mapping table. Ordered by statement, then field; tag lists are
/// append-only.
pub static TAG_PRIORITY_MAP: &[TagMapping] = &[
    // Income statement
    TagMapping {
        field: StandardField::Revenue,
        tags: &[
            "us-gaap:Revenues",
            "us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax",
            "us-gaap:RevenueFromContractWithCustomerIncludingAssessedTax",
            "us-gaap:SalesRevenueNet",
            "us-gaap:SalesRevenueGoodsNet",
            "us-gaap:RevenuesNetOfInterestExpense",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::CostOfRevenue,
        tags: &[
            "us-gaap:CostOfRevenue",
            "us-gaap:CostOfGoodsAndServicesSold",
            "us-gaap:CostOfGoodsSold",
            "us-gaap:CostOfServices",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::GrossProfit,
        tags: &["us-gaap:GrossProfit"],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::OperatingExpenses,
        tags: &[
            "us-gaap:OperatingExpenses",
            "us-gaap:OperatingCostsAndExpenses",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::Ebit,
        tags: &[
            "us-gaap:OperatingIncomeLoss",
            "us-gaap:IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::Ebitda,
        tags: &[
            "us-gaap:EarningsBeforeInterestTaxesDepreciationAmortization",
            "us-gaap:EBITDA",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::InterestExpense,
        tags: &[
            "us-gaap:InterestExpense",
            "us-gaap:InterestAndDebtExpense",
            "us-gaap:InterestExpenseDebt",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::PretaxIncome,
        tags: &[
            "us-gaap:IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
            "us-gaap:IncomeLossFromContinuingOperationsBeforeIncomeTaxesMinorityInterestAndIncomeLossFromEquityMethodInvestments",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::IncomeTaxExpense,
        tags: &["us-gaap:IncomeTaxExpenseBenefit"],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::NetIncome,
        tags: &[
            "us-gaap:NetIncomeLoss",
            "us-gaap:ProfitLoss",
            "us-gaap:NetIncomeLossAvailableToCommonStockholdersBasic",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::EpsBasic,
        tags: &["us-gaap:EarningsPerShareBasic"],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::EpsDiluted,
        tags: &["us-gaap:EarningsPerShareDiluted"],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::SharesBasic,
        tags: &["us-gaap:WeightedAverageNumberOfSharesOutstandingBasic"],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::SharesDiluted,
        tags: &["us-gaap:WeightedAverageNumberOfDilutedSharesOutstanding"],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    // Balance sheet
    TagMapping {
        field: StandardField::CashAndEquivalents,
        tags: &[
            "us-gaap:CashAndCashEquivalentsAtCarryingValue",
            "us-gaap:Cash",
            "us-gaap:CashCashEquivalentsAndShortTermInvestments",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::ShortTermInvestments,
        tags: &[
            "us-gaap:ShortTermInvestments",
            "us-gaap:MarketableSecuritiesCurrent",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::AccountsReceivable,
        tags: &[
            "us-gaap:AccountsReceivableNetCurrent",
            "us-gaap:ReceivablesNetCurrent",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::Inventory,
        tags: &["us-gaap:InventoryNet", "us-gaap:Inventories"],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::CurrentAssets,
        tags: &["us-gaap:AssetsCurrent"],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::PpeNet,
        tags: &[
            "us-gaap:PropertyPlantAndEquipmentNet",
            "us-gaap:PropertyPlantAndEquipmentAndFinanceLeaseRightOfUseAssetAfterAccumulatedDepreciationAndAmortization",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::Goodwill,
        tags: &["us-gaap:Goodwill"],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::Intangibles,
        tags: &[
            "us-gaap:IntangibleAssetsNetExcludingGoodwill",
            "us-gaap:FiniteLivedIntangibleAssetsNet",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::TotalAssets,
        tags: &["us-gaap:Assets"],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::AccountsPayable,
        tags: &[
            "us-gaap:AccountsPayableCurrent",
            "us-gaap:AccountsPayableAndAccruedLiabilitiesCurrent",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::ShortTermDebt,
        tags: &[
            "us-gaap:LongTermDebtCurrent",
            "us-gaap:ShortTermBorrowings",
            "us-gaap:DebtCurrent",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::CurrentLiabilities,
        tags: &["us-gaap:LiabilitiesCurrent"],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::LongTermDebt,
        tags: &[
            "us-gaap:LongTermDebtNoncurrent",
            "us-gaap:LongTermDebt",
            "us-gaap:LongTermDebtAndCapitalLeaseObligations",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::TotalLiabilities,
        tags: &["us-gaap:Liabilities"],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::CommonEquity,
        tags: &[
            "us-gaap:StockholdersEquity",
            "us-gaap:CommonStockholdersEquity",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::RetainedEarnings,
        tags: &["us-gaap:RetainedEarningsAccumulatedDeficit"],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    TagMapping {
        field: StandardField::TotalEquity,
        tags: &[
            "us-gaap:StockholdersEquity",
            "us-gaap:StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Instant,
    },
    // Cash flow statement
    TagMapping {
        field: StandardField::Cfo,
        tags: &[
            "us-gaap:NetCashProvidedByUsedInOperatingActivities",
            "us-gaap:NetCashProvidedByUsedInOperatingActivitiesContinuingOperations",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::Capex,
        tags: &[
            "us-gaap:PaymentsToAcquirePropertyPlantAndEquipment",
            "us-gaap:PaymentsForCapitalImprovements",
            "us-gaap:CapitalExpendituresIncurredButNotYetPaid",
        ],
        sign_flip: true,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::Cfi,
        tags: &[
            "us-gaap:NetCashProvidedByUsedInInvestingActivities",
            "us-gaap:NetCashProvidedByUsedInInvestingActivitiesContinuingOperations",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::Cff,
        tags: &[
            "us-gaap:NetCashProvidedByUsedInFinancingActivities",
            "us-gaap:NetCashProvidedByUsedInFinancingActivitiesContinuingOperations",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::DividendsPaid,
        tags: &[
            "us-gaap:PaymentsOfDividends",
            "us-gaap:PaymentsOfDividendsCommonStock",
        ],
        sign_flip: true,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::ShareRepurchases,
        tags: &["us-gaap:PaymentsForRepurchaseOfCommonStock"],
        sign_flip: true,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::NetChangeInCash,
        tags: &[
            "us-gaap:CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalentsPeriodIncreaseDecreaseIncludingExchangeRateEffect",
            "us-gaap:CashAndCashEquivalentsPeriodIncreaseDecrease",
            "us-gaap:NetCashProvidedByUsedInContinuingOperations",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::DepreciationAmortization,
        tags: &[
            "us-gaap:DepreciationDepletionAndAmortization",
            "us-gaap:DepreciationAndAmortization",
            "us-gaap:Depreciation",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
    TagMapping {
        field: StandardField::StockBasedCompensation,
        tags: &[
            "us-gaap:ShareBasedCompensation",
            "us-gaap:AllocatedShareBasedCompensationExpense",
        ],
        sign_flip: false,
        period_kind: PeriodKind::Duration,
    },
];

/// Returns the mapping for a standard field.
#[must_use]
pub fn mapping_for(field: StandardField) -> Option<&'static TagMapping> {
    TAG_PRIORITY_MAP.iter().find(|m| m.field == field)
}

/// Resolves one field for one fiscal period under a cutoff.
///
/// Tags are tried in priority order; the first with a surviving fact wins.
/// Sign-flipped fields come back positive.
#[must_use]
pub fn resolve_field(
    store: &FactStore,
    field: StandardField,
    target_end: NaiveDate,
    period_type: PeriodType,
    cutoff: NaiveDate,
) -> Option<f64> {
    let mapping = mapping_for(field)?;
    for tag in mapping.tags {
        if let Some(fact) = select_best_fact(
            store.facts_for(tag),
            target_end,
            period_type,
            mapping.period_kind,
            cutoff,
        ) {
            let value = if mapping.sign_flip {
                fact.value.abs()
            } else {
                fact.value
            };
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundsnap_core::types::XbrlFact;
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn duration_fact(tag: &str, value: f64) -> XbrlFact {
        XbrlFact {
            tag: tag.into(),
            value,
            unit: "USD".into(),
            start: Some(d(2022, 1, 1)),
            end: d(2022, 12, 31),
            accession: "0001234567-23-000001".into(),
            form: "10-K".into(),
            frame: None,
            dimensions: BTreeMap::new(),
            filed: d(2023, 2, 15),
        }
    }

    #[test]
    fn every_field_has_exactly_one_mapping() {
        for mapping in TAG_PRIORITY_MAP {
            let count = TAG_PRIORITY_MAP
                .iter()
                .filter(|m| m.field == mapping.field)
                .count();
            assert_eq!(count, 1, "duplicate mapping for {}", mapping.field);
            assert!(!mapping.tags.is_empty(), "empty tags for {}", mapping.field);
        }
    }

    #[test]
    fn statement_classification_matches_period_kind() {
        use fundsnap_core::field::StatementType;
        for mapping in TAG_PRIORITY_MAP {
            let expected = match mapping.field.statement() {
                StatementType::Balance => PeriodKind::Instant,
                StatementType::Income | StatementType::Cashflow => PeriodKind::Duration,
            };
            assert_eq!(
                mapping.period_kind, expected,
                "wrong period kind for {}",
                mapping.field
            );
        }
    }

    #[test]
    fn revenue_priority_starts_with_plain_revenues() {
        let mapping = mapping_for(StandardField::Revenue).unwrap();
        assert_eq!(mapping.tags[0], "us-gaap:Revenues");
        assert!(mapping.tags.len() >= 3);
        assert!(!mapping.sign_flip);
    }

    #[test]
    fn outflow_fields_are_sign_flipped() {
        assert!(mapping_for(StandardField::Capex).unwrap().sign_flip);
        assert!(mapping_for(StandardField::DividendsPaid).unwrap().sign_flip);
        assert!(
            mapping_for(StandardField::ShareRepurchases)
                .unwrap()
                .sign_flip
        );
        assert!(!mapping_for(StandardField::Cfo).unwrap().sign_flip);
    }

    #[test]
    fn first_tag_with_data_wins() {
        let mut store = FactStore::default();
        // Only the second-priority revenue tag has data
        store.insert(duration_fact(
            "us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax",
            500.0,
        ));

        let value = resolve_field(
            &store,
            StandardField::Revenue,
            d(2022, 12, 31),
            PeriodType::Annual,
            d(2023, 12, 31),
        );
        assert_eq!(value, Some(500.0));

        // Once the first-priority tag has data, it shadows the fallback
        store.insert(duration_fact("us-gaap:Revenues", 400.0));
        let value = resolve_field(
            &store,
            StandardField::Revenue,
            d(2022, 12, 31),
            PeriodType::Annual,
            d(2023, 12, 31),
        );
        assert_eq!(value, Some(400.0));
    }

    #[test]
    fn capex_reported_negative_is_stored_positive() {
        let mut store = FactStore::default();
        store.insert(duration_fact(
            "us-gaap:PaymentsToAcquirePropertyPlantAndEquipment",
            -12_000.0,
        ));

        let value = resolve_field(
            &store,
            StandardField::Capex,
            d(2022, 12, 31),
            PeriodType::Annual,
            d(2023, 12, 31),
        );
        assert_eq!(value, Some(12_000.0));
    }

    #[test]
    fn missing_field_resolves_to_none() {
        let store = FactStore::default();
        assert_eq!(
            resolve_field(
                &store,
                StandardField::Goodwill,
                d(2022, 12, 31),
                PeriodType::Annual,
                d(2023, 12, 31),
            ),
            None
        );
    }
}
