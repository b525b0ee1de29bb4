use crate::models::{CategoryTotal, MonthlySummary};
use crate::repository::ReportRepository;
use balances::service::{BalanceError, BalanceService};
use common::money::TOTAL_OUT_OF_RANGE;
use common::{Kind, YearMonth};
use database::{Database, RepositoryError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::instrument;
use transactions::service::{TransactionError, TransactionService};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
}

impl From<RepositoryError> for ReportError {
    fn from(err: RepositoryError) -> Self {
        ReportError::Infrastructure(err.to_string())
    }
}

impl From<TransactionError> for ReportError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::InvalidInput(msg) => ReportError::InvalidInput(msg),
            other => ReportError::Infrastructure(other.to_string()),
        }
    }
}

impl From<BalanceError> for ReportError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::InvalidInput(msg) => ReportError::InvalidInput(msg),
            other => ReportError::Infrastructure(other.to_string()),
        }
    }
}

pub struct ReportService;

impl ReportService {
    /// Month totals per top-level category, largest first.
    ///
    /// Ties are broken by name, then id.
    #[instrument(skip(db))]
    pub async fn monthly_category_totals(
        db: &Database,
        period: YearMonth,
        kind: Option<Kind>,
    ) -> Result<Vec<CategoryTotal>, ReportError> {
        let mut uow = db.begin().await?;
        let mut repo = ReportRepository::new(uow.connection());

        let rows = repo.amounts_by_parent(period, kind).await?;

        let mut groups: HashMap<i64, CategoryTotal> = HashMap::new();
        for row in &rows {
            let amount = row.decimal()?;
            let group = groups.entry(row.group_id).or_insert_with(|| CategoryTotal {
                id: row.group_id,
                name: row.group_name.clone(),
                total: Decimal::ZERO,
            });
            group.total = group
                .total
                .checked_add(amount)
                .ok_or_else(|| ReportError::InvalidInput(TOTAL_OUT_OF_RANGE.to_string()))?;
        }

        let mut totals: Vec<CategoryTotal> = groups.into_values().collect();
        totals.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(totals)
    }

    #[instrument(skip(db))]
    pub async fn monthly_summary(db: &Database, period: YearMonth) -> Result<MonthlySummary, ReportError> {
        let opening = BalanceService::get_opening_balance(db, period).await?;
        let totals = TransactionService::month_totals(db, period).await?;

        MonthlySummary::new(period, &opening, totals).map_err(ReportError::InvalidInput)
    }
}
