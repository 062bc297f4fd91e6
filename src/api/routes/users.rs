//! User routes - registration and profile.

use crate::{
    api::{
        AppState,
        auth::{CurrentUser, TrustedProxy},
    },
    core::user,
    entities::UserModel,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

/// `/api/users`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(register))
        .route("/api/users/me", get(profile))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    currency: Option<String>,
}

/// Only the proxy registers users, after it has authenticated them.
async fn register(
    State(state): State<AppState>,
    _proxy: TrustedProxy,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserModel>)> {
    let currency = req
        .currency
        .unwrap_or_else(|| state.config.defaults.currency.clone());
    let created =
        user::register_user(&state.db, &req.name, &req.email, &currency, state.now()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn profile(CurrentUser(user): CurrentUser) -> Json<UserModel> {
    Json(user)
}
