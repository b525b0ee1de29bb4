use crate::models::{CategoryTotal, MonthlyCategoriesQuery, MonthlySummary};
use crate::service::{ReportError, ReportService};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::extract::ValidatedQuery;
use common::period::PeriodQuery;
use common::{AppState, YearMonth};
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ReportError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ReportError::Infrastructure(detail) => {
                tracing::error!("Report infrastructure error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn reports_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/monthly-categories", get(monthly_categories))
        .route("/monthly-summary", get(monthly_summary))
}

async fn monthly_categories(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<MonthlyCategoriesQuery>,
) -> Result<Json<Vec<CategoryTotal>>, ReportError> {
    let period = YearMonth::new(params.year, params.month).map_err(ReportError::InvalidInput)?;
    let totals = ReportService::monthly_category_totals(&state.db, period, params.kind).await?;
    Ok(Json(totals))
}

async fn monthly_summary(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<PeriodQuery>,
) -> Result<Json<MonthlySummary>, ReportError> {
    let period = params.period().map_err(ReportError::InvalidInput)?;
    let summary = ReportService::monthly_summary(&state.db, period).await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use common::Config;
    use database::get_test_db;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn test_app() -> Router {
        let db = get_test_db().await;
        let config = Config { database_url: "mem".into(), port: 0, max_connections: 1, command: None };
        reports_router().with_state(Arc::new(AppState { db, config }))
    }

    #[tokio::test]
    async fn test_empty_month_reports() {
        let app = test_app().await;

        let (status, body) = get_json(&app, "/monthly-categories?month=3&year=2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = get_json(&app, "/monthly-summary?month=3&year=2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["openingSource"], "suggested");
        assert_eq!(body["available"], "0");
        assert_eq!(body["spentPct"], Value::Null);
    }

    #[tokio::test]
    async fn test_bad_period_is_rejected() {
        let app = test_app().await;

        let (status, body) = get_json(&app, "/monthly-categories?month=13&year=2024").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = get_json(&app, "/monthly-categories?month=1&year=2024&kind=savings").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(&app, "/monthly-summary?month=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_kind_means_all_kinds() {
        let app = test_app().await;

        let (status, body) = get_json(&app, "/monthly-categories?month=3&year=2024&kind=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
