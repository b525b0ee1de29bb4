use crate::models::{
    CreateTransactionRequest, DeleteTransactionQuery, ListTransactionsQuery, Transaction, TransactionDetails,
    UpdateTransactionRequest,
};
use crate::service::{TransactionError, TransactionService};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::extract::{ValidatedJson, ValidatedQuery};
use common::{AppState, YearMonth};
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            TransactionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            TransactionError::NotFound => (StatusCode::NOT_FOUND, "Transaction not found".to_string()),
            TransactionError::Infrastructure(detail) => {
                tracing::error!("Transaction infrastructure error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn transactions_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/",
        get(list_transactions)
            .post(create_transaction)
            .patch(update_transaction)
            .delete(delete_transaction),
    )
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionDetails>>, TransactionError> {
    let period = YearMonth::new(params.year, params.month).map_err(TransactionError::InvalidInput)?;
    let kind = params.kind.unwrap_or_default();

    let transactions = TransactionService::list_transactions(&state.db, period, kind).await?;
    Ok(Json(transactions))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), TransactionError> {
    let transaction = TransactionService::create_transaction(&state.db, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, TransactionError> {
    let (id, input) = payload.into_parts();
    let transaction = TransactionService::update_transaction(&state.db, id, input).await?;
    Ok(Json(transaction))
}

async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<DeleteTransactionQuery>,
) -> Result<impl IntoResponse, TransactionError> {
    TransactionService::delete_transaction(&state.db, params.id).await?;
    Ok(Json(json!({ "ok": true })))
}
