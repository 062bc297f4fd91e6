//! Spend aggregation - budget versus actual spend.
//!
//! Everything here except [`budget_progress`] is pure and recomputed on every
//! call; nothing is cached or persisted.
//!
//! Scoping rules:
//! - only expenses count
//! - the budget category must equal the transaction category exactly (an empty
//!   budget category matches every category)
//! - monthly budgets match on (month, year), yearly budgets on year
//! - custom budgets have no recorded bounds, so their spend is unknown

use crate::{
    core::{budget::list_budgets, transaction::list_by_owner},
    entities::{BudgetPeriod, TransactionKind, budget, transaction},
    errors::Result,
};
use chrono::Datelike;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{debug, instrument};

/// How close a budget is to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Below the alert threshold
    Normal,
    /// At or above the alert threshold, below the limit
    Near,
    /// At or above the limit
    Over,
}

/// Computed spend for one budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpendSummary {
    /// Sum of the matching expenses
    pub spent: f64,
    /// Percentage of the limit used, clamped to 0..=100
    pub percent: u32,
    /// Classification of `percent` against the alert threshold
    pub status: BudgetStatus,
}

/// A budget together with its computed spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    /// The budget itself
    #[serde(flatten)]
    pub budget: budget::Model,
    /// `None` when the budget's period cannot be matched against dates
    pub spend: Option<SpendSummary>,
}

/// Percentage of `amount` used by `spent`, rounded and capped at 100.
///
/// A zero (or otherwise unusable) amount yields 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent(spent: f64, amount: f64) -> u32 {
    if amount <= 0.0 || !amount.is_finite() || spent.is_nan() {
        return 0;
    }
    (spent / amount * 100.0).clamp(0.0, 100.0).round() as u32
}

/// Classifies a percentage against an alert threshold.
#[must_use]
pub fn classify(percent: u32, alert_threshold: i32) -> BudgetStatus {
    let pct = i64::from(percent);
    if pct >= 100 {
        BudgetStatus::Over
    } else if pct >= i64::from(alert_threshold) {
        BudgetStatus::Near
    } else {
        BudgetStatus::Normal
    }
}

fn in_scope(budget: &budget::Model, tx: &transaction::Model) -> bool {
    if tx.kind != TransactionKind::Expense {
        return false;
    }
    if !budget.category.is_empty() && budget.category != tx.category {
        return false;
    }
    let same_year = budget.year == Some(tx.date.year());
    match budget.period {
        BudgetPeriod::Monthly => {
            same_year
                && budget
                    .month
                    .and_then(|m| u32::try_from(m).ok())
                    .is_some_and(|m| m == tx.date.month())
        }
        BudgetPeriod::Yearly => same_year,
        BudgetPeriod::Custom => false,
    }
}

/// Sum of the expenses counted against `budget`, or `None` for custom budgets.
#[must_use]
pub fn spent_for(budget: &budget::Model, transactions: &[transaction::Model]) -> Option<f64> {
    if budget.period == BudgetPeriod::Custom {
        return None;
    }
    Some(
        transactions
            .iter()
            .filter(|tx| in_scope(budget, tx))
            .map(|tx| tx.amount)
            .sum(),
    )
}

/// Computes the spend summary of one budget.
#[must_use]
pub fn summarize(budget: &budget::Model, transactions: &[transaction::Model]) -> Option<SpendSummary> {
    let spent = spent_for(budget, transactions)?;
    let percent = percent(spent, budget.amount);
    Some(SpendSummary {
        spent,
        percent,
        status: classify(percent, budget.alert_threshold),
    })
}

/// Pairs every budget with its spend summary, preserving budget order.
#[must_use]
pub fn summarize_budgets(
    transactions: &[transaction::Model],
    budgets: &[budget::Model],
) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|budget| BudgetProgress {
            spend: summarize(budget, transactions),
            budget: budget.clone(),
        })
        .collect()
}

/// Loads the budgets and transactions of `user_id` and summarizes them.
///
/// Any store failure is returned as is; no partial result is produced.
#[instrument(skip(db))]
pub async fn budget_progress<C>(db: &C, user_id: i64) -> Result<Vec<BudgetProgress>>
where
    C: ConnectionTrait,
{
    let budgets = list_budgets(db, user_id).await?;
    let transactions = list_by_owner(db, user_id).await?;
    debug!(
        "Summarizing {} budgets over {} transactions",
        budgets.len(),
        transactions.len()
    );
    Ok(summarize_budgets(&transactions, &budgets))
}
