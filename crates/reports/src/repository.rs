use common::{Kind, YearMonth};
use database::{self, RepositoryError};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::str::FromStr;

/// One transaction amount keyed by the top-level category it rolls up to.
#[derive(FromRow)]
pub(crate) struct RolledUpAmount {
    pub group_id: i64,
    pub group_name: String,
    pub amount: String,
}

impl RolledUpAmount {
    pub fn decimal(&self) -> Result<Decimal, RepositoryError> {
        Decimal::from_str(&self.amount)
            .map_err(|e| RepositoryError::InvalidData(format!("amount '{}': {}", self.amount, e)))
    }
}

pub(crate) struct ReportRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> ReportRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    /// Amounts dated inside `period`, each tagged with its category's parent
    /// (or the category itself when it is top-level).
    pub async fn amounts_by_parent(
        &mut self,
        period: YearMonth,
        kind: Option<Kind>,
    ) -> Result<Vec<RolledUpAmount>, RepositoryError> {
        let rows = sqlx::query_as::<_, RolledUpAmount>(
            r#"
            SELECT COALESCE(p.id, c.id) AS group_id,
                   COALESCE(p.name, c.name) AS group_name,
                   t.amount AS amount
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            LEFT JOIN categories p ON p.id = c.parent_id
            WHERE strftime('%Y-%m', t.date) = $1
              AND ($2 IS NULL OR t.kind = $3)
            "#,
        )
        .bind(period.key())
        .bind(kind.map(|k| k.as_str()))
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }
}
