use common::YearMonth;
use database::{self, RepositoryError};
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) struct OpeningBalanceRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> OpeningBalanceRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn find(&mut self, period: YearMonth) -> Result<Option<Decimal>, RepositoryError> {
        let raw: Option<String> = sqlx::query_scalar(
            "SELECT amount FROM monthly_opening_balances WHERE year = $1 AND month = $2",
        )
        .bind(period.year())
        .bind(period.month())
        .fetch_optional(&mut *self.conn)
        .await?;

        raw.map(|amount| {
            Decimal::from_str(&amount)
                .map_err(|e| RepositoryError::InvalidData(format!("opening balance '{}': {}", amount, e)))
        })
        .transpose()
    }

    pub async fn upsert(&mut self, period: YearMonth, amount: Decimal) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO monthly_opening_balances (year, month, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT(year, month) DO UPDATE SET amount = excluded.amount
            "#,
        )
        .bind(period.year())
        .bind(period.month())
        .bind(amount.to_string())
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::get_test_db;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_upsert_replaces_existing_amount() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let mut repo = OpeningBalanceRepository::new(uow.connection());
        let period = YearMonth::new(2024, 2).unwrap();

        assert_eq!(repo.find(period).await.unwrap(), None);

        repo.upsert(period, dec!(100.10)).await.unwrap();
        repo.upsert(period, dec!(-5.5)).await.unwrap();

        assert_eq!(repo.find(period).await.unwrap(), Some(dec!(-5.5)));
        assert_eq!(repo.find(YearMonth::new(2024, 3).unwrap()).await.unwrap(), None);
    }
}
