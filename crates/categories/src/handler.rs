use crate::models::{
    CategoryListing, CreateCategoryRequest, DeleteCategoryQuery, ListCategoriesQuery, RawCreateCategoryRequest,
    UpdateCategoryRequest,
};
use crate::service::{CategoryError, CategoryService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::extract::{ValidatedJson, ValidatedQuery};
use common::{AppState, Kind};
use std::sync::Arc;
use serde_json::json;

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            CategoryError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CategoryError::DomainRule(msg) => (StatusCode::BAD_REQUEST, msg),
            CategoryError::NotFound => (StatusCode::NOT_FOUND, "Category not found".to_string()),
            CategoryError::ParentNotFound => (StatusCode::NOT_FOUND, "Parent category not found".to_string()),
            CategoryError::UnknownKind(segment) => (
                StatusCode::NOT_FOUND,
                format!("Unknown category kind '{}'", segment),
            ),
            CategoryError::Infrastructure(detail) => {
                tracing::error!("Category infrastructure error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn categories_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{kind}",
            get(list_categories)
                .post(create_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

fn kind_of(segment: &str) -> Result<Kind, CategoryError> {
    Kind::from_resource(segment).ok_or_else(|| CategoryError::UnknownKind(segment.to_string()))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
    ValidatedQuery(params): ValidatedQuery<ListCategoriesQuery>,
) -> Result<Json<CategoryListing>, CategoryError> {
    let kind = kind_of(&segment)?;
    let listing = CategoryService::list_categories(&state.db, kind, params.as_tree()).await?;
    Ok(Json(listing))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
    ValidatedJson(payload): ValidatedJson<RawCreateCategoryRequest>,
) -> Result<impl IntoResponse, CategoryError> {
    let kind = kind_of(&segment)?;
    let req = CreateCategoryRequest::new(payload).map_err(CategoryError::InvalidInput)?;

    let category = CategoryService::create_category(&state.db, kind, req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, CategoryError> {
    let kind = kind_of(&segment)?;
    let category = CategoryService::update_category(&state.db, kind, payload).await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
    ValidatedQuery(params): ValidatedQuery<DeleteCategoryQuery>,
) -> Result<impl IntoResponse, CategoryError> {
    let kind = kind_of(&segment)?;
    CategoryService::delete_category(&state.db, kind, params.id).await?;
    Ok(Json(json!({ "ok": true })))
}
