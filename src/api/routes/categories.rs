//! Category routes - the caller's own categories plus the global ones.

use crate::{
    api::{AppState, auth::CurrentUser},
    core::category::{self, CategoryUpdate},
    entities::{CategoryModel, TransactionKind},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// `/api/categories`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route("/api/categories/:id", put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    name: String,
    kind: TransactionKind,
    color: Option<String>,
}

async fn list(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<CategoryModel>>> {
    Ok(Json(
        category::list_visible_categories(&state.db, user.id()).await?,
    ))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryModel>)> {
    let created =
        category::create_category(&state.db, user.id(), &req.name, req.kind, req.color).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<CategoryModel>> {
    Ok(Json(
        category::update_category(&state.db, user.id(), id, update).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    category::delete_category(&state.db, user.id(), id).await?;
    Ok(Json(json!({ "message": "Category removed" })))
}
