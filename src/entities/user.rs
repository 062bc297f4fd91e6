//! User entity - The owner of every ledger record.
//!
//! Authentication happens upstream; this table only keeps the profile the
//! API needs (display name, e-mail and preferred currency).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login e-mail, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// Preferred currency code used as the default for new records
    pub currency: String,
    /// When the user registered
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and the records it owns
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One user has many budgets
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
    /// One user has many private categories
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
    /// One user has many recurring definitions
    #[sea_orm(has_many = "super::recurring_transaction::Entity")]
    RecurringTransactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::recurring_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
