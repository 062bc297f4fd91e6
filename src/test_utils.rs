//! Shared test utilities for `FinanceBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    api::AppState,
    config::AppConfig,
    core::{
        budget::{DEFAULT_ALERT_THRESHOLD, NewBudget},
        clock::FixedClock,
        recurring::NewRecurring,
        transaction::{NewTransaction, create_transaction},
        user::register_user,
    },
    entities::{BudgetPeriod, Frequency, TransactionKind, budget, transaction, user},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The instant every test treats as "now": 2024-06-15 12:00 UTC.
pub fn test_now() -> DateTime<Utc> {
    utc(2024, 6, 15, 12)
}

/// Shorthand for a UTC timestamp on the hour.
pub fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Registers a user with the given e-mail.
///
/// # Defaults
/// * `name`: "Test User"
/// * `currency`: "USD"
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    register_user(db, "Test User", email, "USD", test_now()).await
}

/// Fresh database plus one registered user (`test@example.com`).
/// Most tests need an owner before anything else can be stored.
pub async fn setup_with_user() -> Result<(DatabaseConnection, user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test@example.com").await?;
    Ok((db, user))
}

/// Builds an expense input.
///
/// # Defaults
/// * `currency`: "USD"
/// * `payment_method`: "cash"
/// * `description`: empty
pub fn new_expense(category: &str, amount: f64, on: NaiveDate) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Expense,
        category: category.to_string(),
        amount,
        date: on,
        currency: "USD".to_string(),
        payment_method: "cash".to_string(),
        description: String::new(),
    }
}

/// Stores an expense for `user_id`.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    user_id: i64,
    category: &str,
    amount: f64,
    on: NaiveDate,
) -> Result<transaction::Model> {
    create_transaction(db, user_id, new_expense(category, amount, on), test_now()).await
}

/// Stores an income entry for `user_id`.
pub async fn create_test_income(
    db: &DatabaseConnection,
    user_id: i64,
    category: &str,
    amount: f64,
    on: NaiveDate,
) -> Result<transaction::Model> {
    let input = NewTransaction {
        kind: TransactionKind::Income,
        ..new_expense(category, amount, on)
    };
    create_transaction(db, user_id, input, test_now()).await
}

/// An unsaved expense row, for the pure aggregation and report functions.
pub fn expense_model(id: i64, category: &str, amount: f64, on: NaiveDate) -> transaction::Model {
    transaction::Model {
        id,
        user_id: 1,
        kind: TransactionKind::Expense,
        category: category.to_string(),
        amount,
        date: on,
        currency: "USD".to_string(),
        payment_method: "cash".to_string(),
        description: String::new(),
        recurring_id: None,
        created_at: test_now(),
    }
}

/// An unsaved budget row with an alert threshold of 80.
pub fn budget_model(
    id: i64,
    category: &str,
    amount: f64,
    period: BudgetPeriod,
    month: Option<i32>,
    year: Option<i32>,
) -> budget::Model {
    budget::Model {
        id,
        user_id: 1,
        category: category.to_string(),
        amount,
        period,
        month,
        year,
        currency: "USD".to_string(),
        alert_threshold: DEFAULT_ALERT_THRESHOLD,
        description: None,
        created_at: test_now(),
        updated_at: test_now(),
    }
}

/// Builds a monthly budget input with the default alert threshold.
pub fn monthly_budget(category: &str, amount: f64, month: i32, year: i32) -> NewBudget {
    NewBudget {
        category: category.to_string(),
        amount,
        period: BudgetPeriod::Monthly,
        month: Some(month),
        year: Some(year),
        currency: "USD".to_string(),
        alert_threshold: DEFAULT_ALERT_THRESHOLD,
        description: None,
    }
}

/// Builds an active monthly rent definition.
///
/// # Defaults
/// * `kind`: expense
/// * `amount`: 1200.0
/// * `category`: "Rent"
/// * `payment_method`: "bank"
pub fn monthly_rent(next_run_at: DateTime<Utc>) -> NewRecurring {
    NewRecurring {
        kind: TransactionKind::Expense,
        amount: 1200.0,
        category: "Rent".to_string(),
        payment_method: "bank".to_string(),
        description: "Monthly rent".to_string(),
        currency: "USD".to_string(),
        frequency: Frequency::Monthly,
        next_run_at,
        active: true,
    }
}

/// Proxy secret configured by [`test_state`].
pub const TEST_PROXY_SECRET: &str = "test-proxy-secret";

/// Application state over `db` with default configuration, the
/// [`TEST_PROXY_SECRET`] and a clock frozen at [`test_now`].
pub fn test_state(db: DatabaseConnection) -> AppState {
    let mut config = AppConfig::default();
    config.auth.proxy_secret = Some(TEST_PROXY_SECRET.to_string());
    AppState::new(db, Arc::new(config), Arc::new(FixedClock::new(test_now())))
}
