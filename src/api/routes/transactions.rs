//! Transaction routes - ledger CRUD, stats and CSV export.

use crate::{
    api::{AppState, auth::CurrentUser},
    core::{
        report::{self, MonthlyTotals, StatsSummary},
        transaction::{self, NewTransaction, TransactionFilter, TransactionUpdate},
    },
    entities::{TransactionKind, TransactionModel},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, put},
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};

/// Payment method used when a request names none
pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

/// `/api/transactions`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/transactions", get(list).post(create))
        .route("/api/transactions/stats/summary", get(summary))
        .route("/api/transactions/stats/monthly", get(monthly))
        .route("/api/transactions/export", get(export))
        .route("/api/transactions/:id", put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CreateTransactionRequest {
    kind: TransactionKind,
    category: String,
    amount: f64,
    date: Option<NaiveDate>,
    currency: Option<String>,
    payment_method: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YearQuery {
    year: Option<i32>,
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<TransactionModel>>> {
    Ok(Json(
        transaction::list_transactions(&state.db, user.id(), &filter).await?,
    ))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionModel>)> {
    let now = state.now();
    let input = NewTransaction {
        kind: req.kind,
        category: req.category,
        amount: req.amount,
        date: req.date.unwrap_or_else(|| now.date_naive()),
        currency: req.currency.unwrap_or(user.currency),
        payment_method: req
            .payment_method
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
        description: req.description.unwrap_or_default(),
    };
    let created = transaction::create_transaction(&state.db, user.id, input, now).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<TransactionUpdate>,
) -> Result<Json<TransactionModel>> {
    Ok(Json(
        transaction::update_transaction(&state.db, user.id(), id, update).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    transaction::delete_transaction(&state.db, user.id(), id).await?;
    Ok(Json(json!({ "message": "Transaction removed" })))
}

async fn summary(State(state): State<AppState>, user: CurrentUser) -> Result<Json<StatsSummary>> {
    Ok(Json(report::stats_summary(&state.db, user.id()).await?))
}

async fn monthly(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<YearQuery>,
) -> Result<Json<MonthlyTotals>> {
    let year = query.year.unwrap_or_else(|| state.now().year());
    Ok(Json(report::monthly_stats(&state.db, user.id(), year).await?))
}

/// Exports the filtered list, so the file matches what the list endpoint returns.
async fn export(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<TransactionFilter>,
) -> Result<impl IntoResponse> {
    let rows = transaction::list_transactions(&state.db, user.id(), &filter).await?;
    let body = report::transactions_csv(&rows)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        body,
    ))
}
