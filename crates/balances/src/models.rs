use common::money::deserialize_amount;
use common::YearMonth;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceSource {
    Saved,
    Suggested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodRef {
    pub year: i32,
    pub month: u32,
}

impl From<YearMonth> for PeriodRef {
    fn from(period: YearMonth) -> Self {
        PeriodRef { year: period.year(), month: period.month() }
    }
}

/// The money a month starts with, either stored or derived from the month before.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningBalance {
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
    pub source: BalanceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_from: Option<PeriodRef>,
}

impl OpeningBalance {
    pub fn saved(period: YearMonth, amount: Decimal) -> Self {
        OpeningBalance {
            year: period.year(),
            month: period.month(),
            amount,
            source: BalanceSource::Saved,
            suggested_from: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetOpeningBalanceRequest {
    #[validate(range(min = 1, max = 9999, message = "year must be between 1 and 9999"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: u32,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_saved_balance_omits_suggested_from() {
        let balance = OpeningBalance::saved(YearMonth::new(2024, 5).unwrap(), dec!(-12.30));
        assert_eq!(
            serde_json::to_value(&balance).unwrap(),
            json!({ "year": 2024, "month": 5, "amount": "-12.30", "source": "saved" })
        );
    }

    #[test]
    fn test_set_request_validation() {
        let req: SetOpeningBalanceRequest =
            serde_json::from_value(json!({ "year": 2024, "month": 13, "amount": 10 })).unwrap();
        assert!(req.validate().is_err());

        let req: SetOpeningBalanceRequest =
            serde_json::from_value(json!({ "year": 2024, "month": 1, "amount": "10,5" })).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.amount, dec!(10.5));
    }
}
