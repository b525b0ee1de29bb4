use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Largest accepted magnitude for a single amount, exclusive.
pub const AMOUNT_LIMIT: i64 = 1_000_000_000_000_000;

pub const TOTAL_OUT_OF_RANGE: &str = "amount total is out of range";

/// Parses a user supplied amount. A decimal comma is accepted.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err("amount is required".to_string());
    }
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| format!("amount must be a decimal number, got '{}'", raw))?;
    if amount.abs() >= Decimal::from(AMOUNT_LIMIT) {
        return Err(format!("amount must be smaller than {} in magnitude", AMOUNT_LIMIT));
    }
    Ok(amount)
}

/// Adds amounts without panicking; `None` when the total leaves `Decimal`'s range.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

/// Serde adapter for amount fields: accepts `"1234.50"`, `"1234,50"` or `1234.5`.
pub fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let parsed = match RawAmount::deserialize(deserializer)? {
        RawAmount::Text(text) => parse_amount(&text),
        RawAmount::Number(number) => parse_amount(&number.to_string()),
    };
    parsed.map_err(serde::de::Error::custom)
}
