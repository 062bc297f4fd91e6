//! Recurrence materialization - turns due recurring definitions into ledger entries.
//!
//! A definition is due when it is active and its `next_run_at` has arrived. Every
//! due cycle is fired in its own database transaction which inserts the ledger
//! entry and advances the schedule with a compare-and-advance update:
//!
//! ```text
//! UPDATE recurring_transactions
//!    SET next_run_at = :next, last_run_at = :occurrence
//!  WHERE id = :id AND next_run_at = :occurrence AND active
//! ```
//!
//! If no row matches, another worker already fired the cycle; the insert is rolled
//! back and the cycle counted as already handled. Overdue definitions are caught up
//! one cycle at a time, up to `max_cycles_per_run` per run. A failure (or timeout)
//! leaves the definition due and never stops the other definitions of the batch.

use crate::{
    config::app::RecurrenceConfig,
    core::clock::Clock,
    entities::{RecurringTransaction, recurring_transaction, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::{future::Future, time::Duration};
use tracing::{debug, error, info, instrument, warn};

/// One materialized cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredCycle {
    /// Definition the cycle belongs to
    pub definition_id: i64,
    /// Ledger entry that was created
    pub transaction_id: i64,
    /// Scheduled occurrence the entry is dated at
    pub occurrence: DateTime<Utc>,
    /// Schedule position after the cycle
    pub next_run_at: DateTime<Utc>,
}

/// A definition that could not be processed in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionFailure {
    /// Definition that failed
    pub definition_id: i64,
    /// Error description
    pub error: String,
    /// Whether the next run is expected to succeed
    pub retryable: bool,
}

/// Outcome of one materializer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    /// Time the run treated as "now"
    pub run_at: DateTime<Utc>,
    /// Number of definitions that were due
    pub due_definitions: usize,
    /// Every cycle that produced a ledger entry
    pub fired: Vec<FiredCycle>,
    /// Cycles another worker handled first
    pub already_handled: usize,
    /// Definitions that hit the per-run cycle cap and remain due
    pub capped: Vec<i64>,
    /// Definitions that failed and remain due
    pub failures: Vec<DefinitionFailure>,
}

/// Runs `fut` with an upper bound on its duration; running out of time counts as
/// the store being unavailable.
async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::StoreUnavailable {
            message: format!("{what} did not finish within {}ms", limit.as_millis()),
        })?
}

/// Active definitions whose `next_run_at <= now`, soonest first.
///
/// Pass `owner` to restrict the result to one user's definitions.
pub async fn list_due<C>(
    db: &C,
    now: DateTime<Utc>,
    owner: Option<i64>,
) -> Result<Vec<recurring_transaction::Model>>
where
    C: ConnectionTrait,
{
    let mut query = RecurringTransaction::find()
        .filter(recurring_transaction::Column::Active.eq(true))
        .filter(recurring_transaction::Column::NextRunAt.lte(now));
    if let Some(user_id) = owner {
        query = query.filter(recurring_transaction::Column::UserId.eq(user_id));
    }
    query
        .order_by_asc(recurring_transaction::Column::NextRunAt)
        .order_by_asc(recurring_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a definition from `expected` to `new_next`, recording `new_last` as the
/// last run.
///
/// Returns `false` when the stored `next_run_at` no longer equals `expected` (or
/// the definition was paused or deleted), i.e. someone else already advanced it.
pub async fn advance<C>(
    db: &C,
    definition_id: i64,
    expected: DateTime<Utc>,
    new_next: DateTime<Utc>,
    new_last: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = RecurringTransaction::update_many()
        .col_expr(recurring_transaction::Column::NextRunAt, Expr::value(new_next))
        .col_expr(recurring_transaction::Column::LastRunAt, Expr::value(Some(new_last)))
        .col_expr(recurring_transaction::Column::UpdatedAt, Expr::value(now))
        .filter(recurring_transaction::Column::Id.eq(definition_id))
        .filter(recurring_transaction::Column::NextRunAt.eq(expected))
        .filter(recurring_transaction::Column::Active.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Fires the cycle of `definition` scheduled at `occurrence`.
///
/// Inserts the ledger entry and advances the schedule atomically. Returns
/// [`Error::ConcurrentAdvance`] (with nothing written) when the schedule had
/// already moved past `occurrence`.
#[instrument(skip(db, definition), fields(definition_id = definition.id))]
pub async fn fire_cycle(
    db: &DatabaseConnection,
    definition: &recurring_transaction::Model,
    occurrence: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<FiredCycle> {
    let anchor_day = u32::try_from(definition.anchor_day).unwrap_or(1);
    let next_run_at = definition.frequency.advance(occurrence, anchor_day)?;

    let txn = db.begin().await?;

    let inserted = transaction::ActiveModel {
        user_id: Set(definition.user_id),
        kind: Set(definition.kind),
        category: Set(definition.category.clone()),
        amount: Set(definition.amount),
        date: Set(occurrence.date_naive()),
        currency: Set(definition.currency.clone()),
        payment_method: Set(definition.payment_method.clone()),
        description: Set(definition.description.clone()),
        recurring_id: Set(Some(definition.id)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !advance(&txn, definition.id, occurrence, next_run_at, occurrence, now).await? {
        txn.rollback().await?;
        return Err(Error::ConcurrentAdvance {
            definition_id: definition.id,
        });
    }

    txn.commit().await?;

    debug!(
        "Materialized {} for definition {} as transaction {}",
        occurrence, definition.id, inserted.id
    );
    Ok(FiredCycle {
        definition_id: definition.id,
        transaction_id: inserted.id,
        occurrence,
        next_run_at,
    })
}

enum Progress {
    Done,
    Capped,
    AlreadyHandled,
}

/// Fires every due cycle of one definition, pushing each into `fired`.
async fn catch_up(
    db: &DatabaseConnection,
    definition: &recurring_transaction::Model,
    now: DateTime<Utc>,
    config: &RecurrenceConfig,
    fired: &mut Vec<FiredCycle>,
) -> Result<Progress> {
    let mut occurrence = definition.next_run_at;
    let mut cycles = 0;

    while occurrence <= now {
        if cycles >= config.max_cycles_per_run {
            return Ok(Progress::Capped);
        }
        let cycle = bounded(
            config.store_timeout(),
            "materializing a recurring cycle",
            fire_cycle(db, definition, occurrence, now),
        )
        .await;

        match cycle {
            Ok(cycle) => {
                occurrence = cycle.next_run_at;
                fired.push(cycle);
                cycles += 1;
            }
            Err(Error::ConcurrentAdvance { .. }) => return Ok(Progress::AlreadyHandled),
            Err(e) => return Err(e),
        }
    }
    Ok(Progress::Done)
}

/// Materializes every due definition (of `owner`, or of everyone).
///
/// The run only fails as a whole when the due definitions cannot be listed;
/// everything after that is recorded per definition in the report.
#[instrument(skip(db, clock, config))]
pub async fn materialize_due(
    db: &DatabaseConnection,
    clock: &dyn Clock,
    config: &RecurrenceConfig,
    owner: Option<i64>,
) -> Result<MaterializeReport> {
    let now = clock.now();
    let due = bounded(
        config.store_timeout(),
        "listing due recurring definitions",
        list_due(db, now, owner),
    )
    .await?;

    let mut report = MaterializeReport {
        run_at: now,
        due_definitions: due.len(),
        fired: Vec::new(),
        already_handled: 0,
        capped: Vec::new(),
        failures: Vec::new(),
    };

    for definition in &due {
        match catch_up(db, definition, now, config, &mut report.fired).await {
            Ok(Progress::Done) => {}
            Ok(Progress::Capped) => {
                warn!(
                    "Recurring definition {} hit the cap of {} cycles, remaining cycles stay due",
                    definition.id, config.max_cycles_per_run
                );
                report.capped.push(definition.id);
            }
            Ok(Progress::AlreadyHandled) => {
                debug!("Recurring definition {} was already advanced", definition.id);
                report.already_handled += 1;
            }
            Err(e) => {
                error!("Recurring definition {} failed: {}", definition.id, e);
                report.failures.push(DefinitionFailure {
                    definition_id: definition.id,
                    retryable: e.is_retryable(),
                    error: e.to_string(),
                });
            }
        }
    }

    if !report.fired.is_empty() || !report.failures.is_empty() {
        info!(
            "Recurrence run at {}: {} due, {} fired, {} already handled, {} failed",
            now,
            report.due_definitions,
            report.fired.len(),
            report.already_handled,
            report.failures.len()
        );
    }
    Ok(report)
}
