//! Budget routes - CRUD, spend progress and CSV export.

use crate::{
    api::{AppState, auth::CurrentUser},
    core::{
        budget::{self, BudgetUpdate, DEFAULT_ALERT_THRESHOLD, NewBudget},
        report,
        spend::{self, BudgetProgress},
    },
    entities::{BudgetModel, BudgetPeriod},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// `/api/budgets`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/budgets", get(list).post(create))
        .route("/api/budgets/progress", get(progress))
        .route("/api/budgets/export", get(export))
        .route("/api/budgets/:id", put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CreateBudgetRequest {
    #[serde(default)]
    category: String,
    amount: f64,
    period: Option<BudgetPeriod>,
    month: Option<i32>,
    year: Option<i32>,
    currency: Option<String>,
    alert_threshold: Option<i32>,
    description: Option<String>,
}

async fn list(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<BudgetModel>>> {
    Ok(Json(budget::list_budgets(&state.db, user.id()).await?))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<BudgetModel>)> {
    let input = NewBudget {
        category: req.category,
        amount: req.amount,
        period: req.period.unwrap_or(BudgetPeriod::Monthly),
        month: req.month,
        year: req.year,
        currency: req.currency.unwrap_or(user.currency),
        alert_threshold: req.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
        description: req.description,
    };
    let created = budget::create_budget(&state.db, user.id, input, state.now()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<BudgetUpdate>,
) -> Result<Json<BudgetModel>> {
    Ok(Json(
        budget::update_budget(&state.db, user.id(), id, update, state.now()).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    budget::delete_budget(&state.db, user.id(), id).await?;
    Ok(Json(json!({ "message": "Budget removed" })))
}

async fn progress(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<BudgetProgress>>> {
    Ok(Json(spend::budget_progress(&state.db, user.id()).await?))
}

async fn export(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse> {
    let budgets = budget::list_budgets(&state.db, user.id()).await?;
    let body = report::budgets_csv(&budgets)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"budgets.csv\""),
        ],
        body,
    ))
}
