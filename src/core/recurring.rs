//! Recurring definition management.
//!
//! Definitions are templates; [`crate::core::recurrence`] turns the due ones into
//! ledger entries. Setting `next_run_at` also records its day-of-month as the
//! schedule's anchor day.

use crate::{
    core::validation,
    entities::{Frequency, RecurringTransaction, TransactionKind, recurring_transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// A fully specified recurring definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurring {
    /// Kind of the generated transactions
    pub kind: TransactionKind,
    /// Amount copied into every generated transaction
    pub amount: f64,
    /// Category label
    pub category: String,
    /// Payment method label
    pub payment_method: String,
    /// Description copied into every generated transaction
    pub description: String,
    /// ISO currency code
    pub currency: String,
    /// Schedule unit
    pub frequency: Frequency,
    /// First occurrence
    pub next_run_at: DateTime<Utc>,
    /// Paused definitions are never materialized
    pub active: bool,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecurringUpdate {
    /// New kind
    pub kind: Option<TransactionKind>,
    /// New amount
    pub amount: Option<f64>,
    /// New category
    pub category: Option<String>,
    /// New payment method
    pub payment_method: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New currency
    pub currency: Option<String>,
    /// New frequency
    pub frequency: Option<Frequency>,
    /// Reschedules the next occurrence and resets the anchor day
    pub next_run_at: Option<DateTime<Utc>>,
    /// Pause (`false`) or resume (`true`)
    pub active: Option<bool>,
}

fn anchor_day_of(at: DateTime<Utc>) -> i32 {
    i32::try_from(at.day()).unwrap_or(1)
}

/// Creates a recurring definition for `user_id`.
#[instrument(skip(db, input), fields(frequency = ?input.frequency, next_run_at = %input.next_run_at))]
pub async fn create_recurring(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewRecurring,
    now: DateTime<Utc>,
) -> Result<recurring_transaction::Model> {
    let created = recurring_transaction::ActiveModel {
        user_id: Set(user_id),
        kind: Set(input.kind),
        amount: Set(validation::non_negative_amount(input.amount)?),
        category: Set(validation::non_empty("category", &input.category)?),
        payment_method: Set(validation::non_empty("payment_method", &input.payment_method)?),
        description: Set(input.description.trim().to_string()),
        currency: Set(validation::currency(&input.currency)?),
        frequency: Set(input.frequency),
        next_run_at: Set(input.next_run_at),
        last_run_at: Set(None),
        anchor_day: Set(anchor_day_of(input.next_run_at)),
        active: Set(input.active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created {} recurring definition {} for user {}, first run at {}",
        created.frequency.as_str(),
        created.id,
        user_id,
        created.next_run_at
    );
    Ok(created)
}

/// Every recurring definition of `user_id`, soonest first.
pub async fn list_recurring(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<recurring_transaction::Model>> {
    RecurringTransaction::find()
        .filter(recurring_transaction::Column::UserId.eq(user_id))
        .order_by_asc(recurring_transaction::Column::NextRunAt)
        .order_by_asc(recurring_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches a definition owned by `user_id`.
pub async fn get_owned_recurring(
    db: &DatabaseConnection,
    user_id: i64,
    recurring_id: i64,
) -> Result<recurring_transaction::Model> {
    let found = RecurringTransaction::find_by_id(recurring_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "RecurringTransaction",
            id: recurring_id,
        })?;
    if found.user_id != user_id {
        return Err(Error::NotAuthorized {
            entity: "RecurringTransaction",
            id: recurring_id,
        });
    }
    Ok(found)
}

/// Applies `update` to a definition owned by `user_id`.
///
/// A new `next_run_at` may not precede the last materialized occurrence.
/// Rescheduling or changing the frequency re-captures the anchor day from the
/// resulting `next_run_at`.
#[instrument(skip(db, update))]
pub async fn update_recurring(
    db: &DatabaseConnection,
    user_id: i64,
    recurring_id: i64,
    update: RecurringUpdate,
    now: DateTime<Utc>,
) -> Result<recurring_transaction::Model> {
    let existing = get_owned_recurring(db, user_id, recurring_id).await?;
    let last_run_at = existing.last_run_at;
    let frequency_changed = update
        .frequency
        .is_some_and(|frequency| frequency != existing.frequency);
    let next_run_at = update.next_run_at.unwrap_or(existing.next_run_at);
    let mut active: recurring_transaction::ActiveModel = existing.into();

    if let Some(kind) = update.kind {
        active.kind = Set(kind);
    }
    if let Some(amount) = update.amount {
        active.amount = Set(validation::non_negative_amount(amount)?);
    }
    if let Some(category) = update.category {
        active.category = Set(validation::non_empty("category", &category)?);
    }
    if let Some(method) = update.payment_method {
        active.payment_method = Set(validation::non_empty("payment_method", &method)?);
    }
    if let Some(description) = update.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(currency) = update.currency {
        active.currency = Set(validation::currency(&currency)?);
    }
    if let Some(frequency) = update.frequency {
        active.frequency = Set(frequency);
    }
    if update.next_run_at.is_some() {
        if last_run_at.is_some_and(|last| next_run_at < last) {
            return Err(Error::validation(
                "next_run_at",
                "cannot be earlier than the last run",
            ));
        }
        active.next_run_at = Set(next_run_at);
    }
    // A new schedule steps from the current position, not the old anchor
    if update.next_run_at.is_some() || frequency_changed {
        active.anchor_day = Set(anchor_day_of(next_run_at));
    }
    if let Some(is_active) = update.active {
        active.active = Set(is_active);
    }
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    info!(
        "Updated recurring definition {} for user {} (active: {})",
        recurring_id, user_id, updated.active
    );
    Ok(updated)
}

/// Deletes a definition owned by `user_id`. Transactions it produced are kept.
#[instrument(skip(db))]
pub async fn delete_recurring(
    db: &DatabaseConnection,
    user_id: i64,
    recurring_id: i64,
) -> Result<()> {
    get_owned_recurring(db, user_id, recurring_id)
        .await?
        .delete(db)
        .await?;
    info!("Deleted recurring definition {} for user {}", recurring_id, user_id);
    Ok(())
}
