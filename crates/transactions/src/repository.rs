use crate::models::{CategoryWithParent, Transaction, TransactionDetails, TransactionInput};
use categories::models::Category;
use chrono::NaiveDate;
use common::{Kind, YearMonth};
use database::{self, RepositoryError};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn decode_kind(raw: &str) -> Result<Kind, RepositoryError> {
    raw.parse::<Kind>().map_err(RepositoryError::InvalidData)
}

fn decode_date(raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| RepositoryError::InvalidData(format!("date '{}': {}", raw, e)))
}

fn decode_amount(raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw).map_err(|e| RepositoryError::InvalidData(format!("amount '{}': {}", raw, e)))
}

#[derive(FromRow)]
struct TransactionRecord {
    id: i64,
    date: String,
    amount: String,
    note: Option<String>,
    category_id: i64,
    kind: String,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = RepositoryError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: record.id,
            date: decode_date(&record.date)?,
            amount: decode_amount(&record.amount)?,
            note: record.note,
            category_id: record.category_id,
            kind: decode_kind(&record.kind)?,
        })
    }
}

#[derive(FromRow)]
struct DetailsRecord {
    id: i64,
    date: String,
    amount: String,
    note: Option<String>,
    category_id: i64,
    kind: String,
    category_name: String,
    category_kind: String,
    category_parent_id: Option<i64>,
    category_bg_color: Option<String>,
    category_children_bg_color: Option<String>,
    parent_name: Option<String>,
    parent_kind: Option<String>,
    parent_bg_color: Option<String>,
    parent_children_bg_color: Option<String>,
}

impl TryFrom<DetailsRecord> for TransactionDetails {
    type Error = RepositoryError;

    fn try_from(record: DetailsRecord) -> Result<Self, Self::Error> {
        let parent = match (record.category_parent_id, record.parent_name, record.parent_kind) {
            (Some(parent_id), Some(name), Some(kind)) => Some(Category {
                id: parent_id,
                name,
                kind: decode_kind(&kind)?,
                parent_id: None,
                bg_color: record.parent_bg_color,
                children_bg_color: record.parent_children_bg_color,
            }),
            _ => None,
        };

        let category = Category {
            id: record.category_id,
            name: record.category_name,
            kind: decode_kind(&record.category_kind)?,
            parent_id: record.category_parent_id,
            bg_color: record.category_bg_color,
            children_bg_color: record.category_children_bg_color,
        };

        let transaction = Transaction::try_from(TransactionRecord {
            id: record.id,
            date: record.date,
            amount: record.amount,
            note: record.note,
            category_id: record.category_id,
            kind: record.kind,
        })?;

        Ok(TransactionDetails {
            transaction,
            category: CategoryWithParent { category, parent },
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, date, amount, note, category_id, kind FROM transactions";

pub(crate) struct TransactionRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, input: &TransactionInput) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (date, amount, note, category_id, kind) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(input.date.format(DATE_FORMAT).to_string())
        .bind(input.amount.to_string())
        .bind(input.note.as_deref())
        .bind(input.category_id)
        .bind(input.kind.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn update(&mut self, id: i64, input: &TransactionInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transactions SET date = $1, amount = $2, note = $3, category_id = $4, kind = $5 WHERE id = $6",
        )
        .bind(input.date.format(DATE_FORMAT).to_string())
        .bind(input.amount.to_string())
        .bind(input.note.as_deref())
        .bind(input.category_id)
        .bind(input.kind.as_str())
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Transaction>, RepositoryError> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        record.map(Transaction::try_from).transpose()
    }

    /// Kind of the category `id`, if it exists.
    pub async fn category_kind(&mut self, id: i64) -> Result<Option<Kind>, RepositoryError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT kind FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        raw.as_deref().map(decode_kind).transpose()
    }

    /// Transactions of `kind` dated inside `period`, newest first.
    pub async fn list_for_period(
        &mut self,
        kind: Kind,
        period: YearMonth,
    ) -> Result<Vec<TransactionDetails>, RepositoryError> {
        let records = sqlx::query_as::<_, DetailsRecord>(
            r#"
            SELECT t.id AS id, t.date AS date, t.amount AS amount, t.note AS note,
                   t.category_id AS category_id, t.kind AS kind,
                   c.name AS category_name, c.kind AS category_kind, c.parent_id AS category_parent_id,
                   c.bg_color AS category_bg_color, c.children_bg_color AS category_children_bg_color,
                   p.name AS parent_name, p.kind AS parent_kind,
                   p.bg_color AS parent_bg_color, p.children_bg_color AS parent_children_bg_color
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            LEFT JOIN categories p ON p.id = c.parent_id
            WHERE t.kind = $1 AND strftime('%Y-%m', t.date) = $2
            ORDER BY t.date DESC, t.id DESC
            "#,
        )
        .bind(kind.as_str())
        .bind(period.key())
        .fetch_all(&mut *self.conn)
        .await?;

        records.into_iter().map(TransactionDetails::try_from).collect()
    }

    /// Amounts of `kind` dated inside `period`.
    pub async fn amounts(&mut self, kind: Kind, period: YearMonth) -> Result<Vec<Decimal>, RepositoryError> {
        let amounts: Vec<String> = sqlx::query_scalar(
            "SELECT amount FROM transactions WHERE kind = $1 AND strftime('%Y-%m', date) = $2 ORDER BY id",
        )
        .bind(kind.as_str())
        .bind(period.key())
        .fetch_all(&mut *self.conn)
        .await?;

        amounts.iter().map(|raw| decode_amount(raw)).collect()
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
