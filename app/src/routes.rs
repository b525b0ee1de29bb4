use axum::Router;
use common::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::<Arc<AppState>>::new()
        .nest("/categories", categories::handler::categories_router())
        .nest("/transactions", transactions::handler::transactions_router())
        .nest("/monthly-opening-balance", balances::handler::balances_router())
        .nest("/reports", reports::handler::reports_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
