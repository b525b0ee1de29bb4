use crate::models::{MonthTotals, Transaction, TransactionDetails, TransactionInput};
use crate::repository::TransactionRepository;
use common::money::{checked_sum, TOTAL_OUT_OF_RANGE};
use common::{Kind, YearMonth};
use database::{Database, RepositoryError};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Transaction not found")]
    NotFound,
}

impl From<RepositoryError> for TransactionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => TransactionError::NotFound,
            RepositoryError::Infrastructure(e) => TransactionError::Infrastructure(e.to_string()),
            _ => TransactionError::Infrastructure(err.to_string()),
        }
    }
}

pub struct TransactionService;

impl TransactionService {
    #[instrument(skip(db))]
    pub async fn list_transactions(
        db: &Database,
        period: YearMonth,
        kind: Kind,
    ) -> Result<Vec<TransactionDetails>, TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transactions = repo
            .list_for_period(kind, period)
            .await?;

        Ok(transactions)
    }

    #[instrument(skip(db))]
    pub async fn create_transaction(db: &Database, input: TransactionInput) -> Result<Transaction, TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        ensure_category_matches_kind(&mut repo, input.category_id, input.kind).await?;
        let id = repo.create(&input).await?;
        let transaction = repo.find_by_id(id).await?
            .ok_or(TransactionError::NotFound)?;

        uow.commit().await?;

        tracing::info!(id, kind = %transaction.kind, "Created transaction");
        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn update_transaction(
        db: &Database,
        id: i64,
        input: TransactionInput,
    ) -> Result<Transaction, TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        ensure_category_matches_kind(&mut repo, input.category_id, input.kind).await?;
        repo.update(id, &input).await?;
        let transaction = repo.find_by_id(id).await?
            .ok_or(TransactionError::NotFound)?;

        uow.commit().await?;

        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn delete_transaction(db: &Database, id: i64) -> Result<(), TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.delete(id).await?;

        uow.commit().await?;

        tracing::info!(id, "Deleted transaction");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn month_totals(db: &Database, period: YearMonth) -> Result<MonthTotals, TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let income = checked_sum(repo.amounts(Kind::Income, period).await?);
        let expense = checked_sum(repo.amounts(Kind::Expense, period).await?);

        match (income, expense) {
            (Some(income), Some(expense)) => Ok(MonthTotals { income, expense }),
            _ => Err(TransactionError::InvalidInput(TOTAL_OUT_OF_RANGE.to_string())),
        }
    }
}

/// Rejects a category that is missing or belongs to the other kind.
async fn ensure_category_matches_kind(
    repo: &mut TransactionRepository<'_>,
    category_id: i64,
    kind: Kind,
) -> Result<(), TransactionError> {
    match repo.category_kind(category_id).await? {
        Some(found) if found == kind => Ok(()),
        _ => Err(TransactionError::InvalidInput(format!("Category not found for kind {}", kind))),
    }
}
