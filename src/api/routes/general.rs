//! General routes - banner and health check.

use crate::{api::AppState, errors::Error};
use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use tracing::warn;

/// `/` and `/health`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
}

async fn banner() -> &'static str {
    "Finance Buddy API is running"
}

/// Reports healthy only when the store answers.
async fn health(State(state): State<AppState>) -> Result<Json<Value>, Error> {
    state.db.ping().await.map_err(|e| {
        warn!("Health check failed: {}", e);
        Error::StoreUnavailable {
            message: "database did not answer the health check".to_string(),
        }
    })?;
    Ok(Json(json!({ "status": "ok" })))
}
