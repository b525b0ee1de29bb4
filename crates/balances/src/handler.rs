use crate::models::{OpeningBalance, SetOpeningBalanceRequest};
use crate::service::{BalanceError, BalanceService};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::extract::{ValidatedJson, ValidatedQuery};
use common::period::PeriodQuery;
use common::{AppState, YearMonth};
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for BalanceError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            BalanceError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            BalanceError::Infrastructure(detail) => {
                tracing::error!("Opening balance infrastructure error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn balances_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_opening_balance).put(set_opening_balance))
}

async fn get_opening_balance(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<PeriodQuery>,
) -> Result<Json<OpeningBalance>, BalanceError> {
    let period = params.period().map_err(BalanceError::InvalidInput)?;
    let balance = BalanceService::get_opening_balance(&state.db, period).await?;
    Ok(Json(balance))
}

async fn set_opening_balance(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SetOpeningBalanceRequest>,
) -> Result<Json<OpeningBalance>, BalanceError> {
    let period = YearMonth::new(payload.year, payload.month).map_err(BalanceError::InvalidInput)?;
    let balance = BalanceService::set_opening_balance(&state.db, period, payload.amount).await?;
    Ok(Json(balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use common::Config;
    use database::get_test_db;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let db = get_test_db().await;
        let config = Config { database_url: "mem".into(), port: 0, max_connections: 1, command: None };
        balances_router().with_state(Arc::new(AppState { db, config }))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_put_then_get_returns_saved() {
        let app = test_app().await;

        let (status, saved) = send(&app, "PUT", "/", Some(json!({ "year": 2024, "month": 3, "amount": "1234.50" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved, json!({ "year": 2024, "month": 3, "amount": "1234.50", "source": "saved" }));

        let (status, fetched) = send(&app, "GET", "/?year=2024&month=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_get_unsaved_month_is_suggested() {
        let app = test_app().await;

        let (status, body) = send(&app, "GET", "/?year=2024&month=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "suggested");
        assert_eq!(body["amount"], "0");
        assert_eq!(body["suggestedFrom"], json!({ "year": 2023, "month": 12 }));
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let app = test_app().await;

        let (status, body) = send(&app, "GET", "/?year=2024&month=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("month"));

        let (status, _) = send(&app, "PUT", "/", Some(json!({ "year": 2024, "month": 3, "amount": "abc" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/?year=abc&month=1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
