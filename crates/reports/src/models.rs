use balances::models::{BalanceSource, OpeningBalance};
use common::kind::deserialize_optional_kind;
use common::money::TOTAL_OUT_OF_RANGE;
use common::{Kind, YearMonth};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use transactions::models::MonthTotals;
use validator::Validate;

/// Sum of a month's transactions rolled up to one top-level category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub id: i64,
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MonthlyCategoriesQuery {
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: u32,
    #[validate(range(min = 1, max = 9999, message = "year must be between 1 and 9999"))]
    pub year: i32,
    #[serde(default, deserialize_with = "deserialize_optional_kind")]
    pub kind: Option<Kind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub opening_balance: Decimal,
    pub opening_source: BalanceSource,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub available: Decimal,
    pub balance: Decimal,
    pub spent_pct: Option<Decimal>,
}

impl MonthlySummary {
    pub fn new(period: YearMonth, opening: &OpeningBalance, totals: MonthTotals) -> Result<Self, String> {
        let out_of_range = || TOTAL_OUT_OF_RANGE.to_string();

        let available = opening.amount.checked_add(totals.income).ok_or_else(out_of_range)?;
        let balance = available.checked_sub(totals.expense).ok_or_else(out_of_range)?;
        let spent_pct = if available > Decimal::ZERO {
            let pct = totals
                .expense
                .checked_div(available)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(out_of_range)?;
            Some(pct.round_dp(2))
        } else {
            None
        };

        Ok(MonthlySummary {
            year: period.year(),
            month: period.month(),
            opening_balance: opening.amount,
            opening_source: opening.source,
            income_total: totals.income,
            expense_total: totals.expense,
            available,
            balance,
            spent_pct,
        })
    }
}
