//! Transaction entity - One ledger entry.
//!
//! Each transaction has an owner, a `kind` (income/expense), a free-text `category`
//! label, a non-negative `amount`, a calendar `date`, and bookkeeping metadata.
//! The category is matched by name only; there is no foreign key to `categories`.
use super::sea_orm_active_enums::TransactionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the transaction
    pub user_id: i64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Category label, compared to budgets by exact string match
    pub category: String,
    /// Non-negative amount; direction comes from `kind`
    pub amount: f64,
    /// Calendar date the transaction belongs to
    pub date: Date,
    /// ISO currency code
    pub currency: String,
    /// How it was paid (`"cash"`, `"card"`, ...)
    pub payment_method: String,
    /// Free-text description
    pub description: String,
    /// Recurring definition that materialized this entry, if any
    pub recurring_id: Option<i64>,
    /// When the row was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
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
