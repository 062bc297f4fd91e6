//! Recurring transaction entity - A template the materializer turns into ledger entries.
//!
//! `next_run_at` is the next scheduled occurrence, `last_run_at` the occurrence that
//! was most recently materialized. `anchor_day` remembers the day-of-month the
//! schedule was set up with so monthly/yearly clamping (Jan 31 -> Feb 29) does not
//! drift the following occurrences.

use super::sea_orm_active_enums::{Frequency, TransactionKind};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_transactions")]
pub struct Model {
    /// Unique identifier for the definition
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the definition and of every transaction it emits
    pub user_id: i64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Amount copied onto each emitted transaction
    pub amount: f64,
    /// Category label copied onto each emitted transaction
    pub category: String,
    /// Payment method copied onto each emitted transaction
    pub payment_method: String,
    /// Description copied onto each emitted transaction
    pub description: String,
    /// ISO currency code
    pub currency: String,
    /// Daily, weekly, monthly or yearly
    pub frequency: Frequency,
    /// Next scheduled occurrence
    pub next_run_at: DateTimeUtc,
    /// Most recently materialized occurrence
    pub last_run_at: Option<DateTimeUtc>,
    /// Day-of-month the schedule returns to after end-of-month clamping
    pub anchor_day: i32,
    /// Paused definitions are never due
    pub active: bool,
    /// When the definition was created
    pub created_at: DateTimeUtc,
    /// When the definition was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between RecurringTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each definition belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
