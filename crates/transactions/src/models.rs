use categories::models::Category;
use chrono::NaiveDate;
use common::money::deserialize_amount;
use common::validation::non_empty;
use common::kind::deserialize_optional_kind;
use common::Kind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub note: Option<String>,
    pub category_id: i64,
    pub kind: Kind,
}

/// A category as embedded in a transaction listing, with its parent joined in.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CategoryWithParent {
    #[serde(flatten)]
    pub category: Category,
    pub parent: Option<Category>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: CategoryWithParent,
}

/// Fields shared by create and update once they have been decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category_id: i64,
    pub note: Option<String>,
    pub kind: Kind,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub date: NaiveDate,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    pub category_id: i64,
    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
    #[serde(default)]
    pub kind: Kind,
}

impl From<CreateTransactionRequest> for TransactionInput {
    fn from(req: CreateTransactionRequest) -> Self {
        TransactionInput {
            date: req.date,
            amount: req.amount,
            category_id: req.category_id,
            note: non_empty(req.note),
            kind: req.kind,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    pub category_id: i64,
    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
    #[serde(default)]
    pub kind: Kind,
}

impl UpdateTransactionRequest {
    pub fn into_parts(self) -> (i64, TransactionInput) {
        let input = TransactionInput {
            date: self.date,
            amount: self.amount,
            category_id: self.category_id,
            note: non_empty(self.note),
            kind: self.kind,
        };
        (self.id, input)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListTransactionsQuery {
    #[validate(range(min = 1, max = 12, message = "month must be between 1 and 12"))]
    pub month: u32,
    #[validate(range(min = 1, max = 9999, message = "year must be between 1 and 9999"))]
    pub year: i32,
    #[serde(default, deserialize_with = "deserialize_optional_kind")]
    pub kind: Option<Kind>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteTransactionQuery {
    pub id: i64,
}

/// Income and expense sums for one calendar month.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MonthTotals {
    pub income: Decimal,
    pub expense: Decimal,
}
