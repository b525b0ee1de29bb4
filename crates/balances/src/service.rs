use crate::models::{BalanceSource, OpeningBalance};
use crate::repository::OpeningBalanceRepository;
use common::money::TOTAL_OUT_OF_RANGE;
use common::YearMonth;
use database::{Database, RepositoryError};
use rust_decimal::Decimal;
use tracing::instrument;
use transactions::service::{TransactionError, TransactionService};

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
}

impl From<RepositoryError> for BalanceError {
    fn from(err: RepositoryError) -> Self {
        BalanceError::Infrastructure(err.to_string())
    }
}

impl From<TransactionError> for BalanceError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::InvalidInput(msg) => BalanceError::InvalidInput(msg),
            other => BalanceError::Infrastructure(other.to_string()),
        }
    }
}

pub struct BalanceService;

impl BalanceService {
    /// Returns the saved opening balance for `period`, or a suggestion of
    /// `previous opening + previous income - previous expense`.
    ///
    /// The previous opening counts only if it was saved (zero otherwise);
    /// the suggestion never looks further back than one month.
    #[instrument(skip(db))]
    pub async fn get_opening_balance(db: &Database, period: YearMonth) -> Result<OpeningBalance, BalanceError> {
        let previous = period.previous();

        let (saved, previous_opening) = {
            let mut uow = db.begin().await?;
            let mut repo = OpeningBalanceRepository::new(uow.connection());
            (repo.find(period).await?, repo.find(previous).await?)
        };

        if let Some(amount) = saved {
            return Ok(OpeningBalance::saved(period, amount));
        }

        let totals = TransactionService::month_totals(db, previous).await?;
        let amount = previous_opening
            .unwrap_or(Decimal::ZERO)
            .checked_add(totals.income)
            .and_then(|sum| sum.checked_sub(totals.expense))
            .ok_or_else(|| BalanceError::InvalidInput(TOTAL_OUT_OF_RANGE.to_string()))?;
        tracing::debug!(%amount, from_saved = previous_opening.is_some(), "Suggested opening balance");

        Ok(OpeningBalance {
            year: period.year(),
            month: period.month(),
            amount,
            source: BalanceSource::Suggested,
            suggested_from: Some(previous.into()),
        })
    }

    #[instrument(skip(db))]
    pub async fn set_opening_balance(
        db: &Database,
        period: YearMonth,
        amount: Decimal,
    ) -> Result<OpeningBalance, BalanceError> {
        let mut uow = db.begin().await?;
        let mut repo = OpeningBalanceRepository::new(uow.connection());

        repo.upsert(period, amount).await?;
        let stored = repo.find(period).await?.unwrap_or(amount);

        uow.commit().await?;

        tracing::info!(year = period.year(), month = period.month(), %stored, "Saved opening balance");
        Ok(OpeningBalance::saved(period, stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodRef;
    use categories::models::CreateCategoryRequest;
    use categories::service::CategoryService;
    use chrono::NaiveDate;
    use common::Kind;
    use database::get_test_db;
    use rust_decimal_macros::dec;
    use transactions::models::TransactionInput;

    async fn record(db: &Database, category_id: i64, kind: Kind, date: (i32, u32, u32), amount: Decimal) {
        TransactionService::create_transaction(
            db,
            TransactionInput {
                date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                amount,
                category_id,
                note: None,
                kind,
            },
        )
        .await
        .unwrap();
    }

    async fn parent(db: &Database, name: &str, kind: Kind) -> i64 {
        CategoryService::create_category(
            db,
            kind,
            CreateCategoryRequest::Parent {
                name: name.to_string(),
                bg_color: "#111111".to_string(),
                children_bg_color: "#222222".to_string(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_suggestion_from_previous_month() {
        let db = get_test_db().await;
        let salary = parent(&db, "Salary", Kind::Income).await;
        let food = parent(&db, "Food", Kind::Expense).await;

        BalanceService::set_opening_balance(&db, YearMonth::new(2024, 2).unwrap(), dec!(100)).await.unwrap();
        record(&db, salary, Kind::Income, (2024, 2, 1), dec!(1000.50)).await;
        record(&db, food, Kind::Expense, (2024, 2, 29), dec!(300.25)).await;
        record(&db, food, Kind::Expense, (2024, 3, 1), dec!(999)).await;

        let balance = BalanceService::get_opening_balance(&db, YearMonth::new(2024, 3).unwrap()).await.unwrap();

        assert_eq!(balance.source, BalanceSource::Suggested);
        assert_eq!(balance.amount, dec!(800.25));
        assert_eq!(balance.suggested_from, Some(PeriodRef { year: 2024, month: 2 }));
    }

    #[tokio::test]
    async fn test_january_looks_at_previous_december() {
        let db = get_test_db().await;
        let salary = parent(&db, "Salary", Kind::Income).await;
        record(&db, salary, Kind::Income, (2023, 12, 24), dec!(42)).await;

        let balance = BalanceService::get_opening_balance(&db, YearMonth::new(2024, 1).unwrap()).await.unwrap();

        assert_eq!(balance.amount, dec!(42));
        assert_eq!(balance.suggested_from, Some(PeriodRef { year: 2023, month: 12 }));
    }

    #[tokio::test]
    async fn test_suggestion_is_single_step() {
        let db = get_test_db().await;
        let salary = parent(&db, "Salary", Kind::Income).await;
        // February has no saved opening, so March ignores January entirely.
        record(&db, salary, Kind::Income, (2024, 1, 10), dec!(500)).await;
        record(&db, salary, Kind::Income, (2024, 2, 10), dec!(20)).await;

        let balance = BalanceService::get_opening_balance(&db, YearMonth::new(2024, 3).unwrap()).await.unwrap();
        assert_eq!(balance.amount, dec!(20));
    }

    #[tokio::test]
    async fn test_saved_balance_wins_and_is_not_derived() {
        let db = get_test_db().await;
        let period = YearMonth::new(2024, 6).unwrap();

        let saved = BalanceService::set_opening_balance(&db, period, dec!(1234.50)).await.unwrap();
        assert_eq!(saved.source, BalanceSource::Saved);

        let fetched = BalanceService::get_opening_balance(&db, period).await.unwrap();
        assert_eq!(fetched, OpeningBalance::saved(period, dec!(1234.50)));
    }

    #[tokio::test]
    async fn test_suggestion_is_not_persisted() {
        let db = get_test_db().await;
        let period = YearMonth::new(2024, 6).unwrap();

        BalanceService::get_opening_balance(&db, period).await.unwrap();
        let next = BalanceService::get_opening_balance(&db, YearMonth::new(2024, 7).unwrap()).await.unwrap();

        assert_eq!(next.source, BalanceSource::Suggested);
        assert_eq!(next.amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_suggestion_out_of_range_is_an_error() {
        let db = get_test_db().await;
        let salary = parent(&db, "Salary", Kind::Income).await;

        BalanceService::set_opening_balance(&db, YearMonth::new(2024, 2).unwrap(), Decimal::MAX).await.unwrap();
        record(&db, salary, Kind::Income, (2024, 2, 1), Decimal::MAX).await;

        let result = BalanceService::get_opening_balance(&db, YearMonth::new(2024, 3).unwrap()).await;
        assert!(matches!(result, Err(BalanceError::InvalidInput(msg)) if msg == TOTAL_OUT_OF_RANGE));
    }
}
