//! Budget business logic - the budget registry.
//!
//! A budget is a spending limit scoped by category and period. Validation is done
//! on the fully merged budget, so a partial update can never leave a monthly
//! budget without a month.

use crate::{
    core::validation,
    entities::{Budget, BudgetPeriod, budget},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Alert threshold used when none is given
pub const DEFAULT_ALERT_THRESHOLD: i32 = 80;

/// A fully specified budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// Category label; empty means all categories
    pub category: String,
    /// Spending limit, `> 0`
    pub amount: f64,
    /// Period kind
    pub period: BudgetPeriod,
    /// 1-12, required for monthly budgets
    pub month: Option<i32>,
    /// Required for monthly and yearly budgets
    pub year: Option<i32>,
    /// ISO currency code
    pub currency: String,
    /// Percentage at which the budget is reported as near its limit
    pub alert_threshold: i32,
    /// Optional note
    pub description: Option<String>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetUpdate {
    /// New category label
    pub category: Option<String>,
    /// New limit
    pub amount: Option<f64>,
    /// New period kind
    pub period: Option<BudgetPeriod>,
    /// New month
    pub month: Option<i32>,
    /// New year
    pub year: Option<i32>,
    /// New currency
    pub currency: Option<String>,
    /// New alert threshold
    pub alert_threshold: Option<i32>,
    /// New description
    pub description: Option<String>,
}

fn validate(input: NewBudget) -> Result<NewBudget> {
    let amount = validation::positive_amount(input.amount)?;
    let currency = validation::currency(&input.currency)?;
    if !(0..=100).contains(&input.alert_threshold) {
        return Err(Error::validation(
            "alert_threshold",
            "must be between 0 and 100",
        ));
    }
    if let Some(year) = input.year {
        if !(1..=9999).contains(&year) {
            return Err(Error::validation("year", format!("{year} is out of range")));
        }
    }

    let (month, year) = match input.period {
        BudgetPeriod::Monthly => {
            let month = input
                .month
                .ok_or_else(|| Error::validation("month", "is required for monthly budgets"))?;
            if !(1..=12).contains(&month) {
                return Err(Error::validation("month", "must be between 1 and 12"));
            }
            let year = input
                .year
                .ok_or_else(|| Error::validation("year", "is required for monthly budgets"))?;
            (Some(month), Some(year))
        }
        BudgetPeriod::Yearly => {
            let year = input
                .year
                .ok_or_else(|| Error::validation("year", "is required for yearly budgets"))?;
            (None, Some(year))
        }
        BudgetPeriod::Custom => (input.month, input.year),
    };

    Ok(NewBudget {
        category: input.category.trim().to_string(),
        amount,
        month,
        year,
        currency,
        description: input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        ..input
    })
}

/// Creates a budget for `user_id`.
#[instrument(skip(db, input), fields(period = ?input.period, amount = input.amount))]
pub async fn create_budget(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewBudget,
    now: DateTime<Utc>,
) -> Result<budget::Model> {
    let input = validate(input)?;
    let created = budget::ActiveModel {
        user_id: Set(user_id),
        category: Set(input.category),
        amount: Set(input.amount),
        period: Set(input.period),
        month: Set(input.month),
        year: Set(input.year),
        currency: Set(input.currency),
        alert_threshold: Set(input.alert_threshold),
        description: Set(input.description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        "Created {} budget {} for user {} ({:.2})",
        created.period.as_str(),
        created.id,
        user_id,
        created.amount
    );
    Ok(created)
}

/// Every budget of `user_id`, newest first.
pub async fn list_budgets<C>(db: &C, user_id: i64) -> Result<Vec<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .order_by_desc(budget::Column::CreatedAt)
        .order_by_desc(budget::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn get_owned_budget(
    db: &DatabaseConnection,
    user_id: i64,
    budget_id: i64,
) -> Result<budget::Model> {
    let found = Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Budget",
            id: budget_id,
        })?;
    if found.user_id != user_id {
        return Err(Error::NotAuthorized {
            entity: "Budget",
            id: budget_id,
        });
    }
    Ok(found)
}

/// Applies `update` to a budget owned by `user_id`.
#[instrument(skip(db, update))]
pub async fn update_budget(
    db: &DatabaseConnection,
    user_id: i64,
    budget_id: i64,
    update: BudgetUpdate,
    now: DateTime<Utc>,
) -> Result<budget::Model> {
    let existing = get_owned_budget(db, user_id, budget_id).await?;
    let merged = validate(NewBudget {
        category: update.category.unwrap_or_else(|| existing.category.clone()),
        amount: update.amount.unwrap_or(existing.amount),
        period: update.period.unwrap_or(existing.period),
        month: update.month.or(existing.month),
        year: update.year.or(existing.year),
        currency: update.currency.unwrap_or_else(|| existing.currency.clone()),
        alert_threshold: update.alert_threshold.unwrap_or(existing.alert_threshold),
        description: update.description.or_else(|| existing.description.clone()),
    })?;

    let mut active: budget::ActiveModel = existing.into();
    active.category = Set(merged.category);
    active.amount = Set(merged.amount);
    active.period = Set(merged.period);
    active.month = Set(merged.month);
    active.year = Set(merged.year);
    active.currency = Set(merged.currency);
    active.alert_threshold = Set(merged.alert_threshold);
    active.description = Set(merged.description);
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    info!("Updated budget {} for user {}", budget_id, user_id);
    Ok(updated)
}

/// Deletes a budget owned by `user_id`.
#[instrument(skip(db))]
pub async fn delete_budget(db: &DatabaseConnection, user_id: i64, budget_id: i64) -> Result<()> {
    get_owned_budget(db, user_id, budget_id)
        .await?
        .delete(db)
        .await?;
    info!("Deleted budget {} for user {}", budget_id, user_id);
    Ok(())
}
