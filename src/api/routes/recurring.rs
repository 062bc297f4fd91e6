//! Recurring definition routes - CRUD and an on-demand run for the caller.

use crate::{
    api::{AppState, auth::CurrentUser},
    core::{
        recurrence::{self, MaterializeReport},
        recurring::{self, NewRecurring, RecurringUpdate},
    },
    entities::{Frequency, RecurringTransactionModel, TransactionKind},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use super::transactions::DEFAULT_PAYMENT_METHOD;

/// `/api/recurring`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/recurring", get(list).post(create))
        .route("/api/recurring/run", post(run))
        .route("/api/recurring/:id", put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CreateRecurringRequest {
    kind: TransactionKind,
    amount: f64,
    category: String,
    payment_method: Option<String>,
    description: Option<String>,
    currency: Option<String>,
    frequency: Frequency,
    next_run_at: Option<DateTime<Utc>>,
    active: Option<bool>,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<RecurringTransactionModel>>> {
    Ok(Json(recurring::list_recurring(&state.db, user.id()).await?))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateRecurringRequest>,
) -> Result<(StatusCode, Json<RecurringTransactionModel>)> {
    let now = state.now();
    let input = NewRecurring {
        kind: req.kind,
        amount: req.amount,
        category: req.category,
        payment_method: req
            .payment_method
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
        description: req.description.unwrap_or_default(),
        currency: req.currency.unwrap_or(user.currency),
        frequency: req.frequency,
        next_run_at: req.next_run_at.unwrap_or(now),
        active: req.active.unwrap_or(true),
    };
    let created = recurring::create_recurring(&state.db, user.id, input, now).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<RecurringUpdate>,
) -> Result<Json<RecurringTransactionModel>> {
    Ok(Json(
        recurring::update_recurring(&state.db, user.id(), id, update, state.now()).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    recurring::delete_recurring(&state.db, user.id(), id).await?;
    Ok(Json(json!({ "message": "Recurring transaction removed" })))
}

/// Materializes the caller's due definitions now instead of waiting for the worker.
async fn run(State(state): State<AppState>, user: CurrentUser) -> Result<Json<MaterializeReport>> {
    let report = recurrence::materialize_due(
        &state.db,
        state.clock.as_ref(),
        &state.config.recurrence,
        Some(user.id()),
    )
    .await?;
    Ok(Json(report))
}
