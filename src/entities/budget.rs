//! Budget entity - A spending limit for one user.
//!
//! Scoped by category (empty = all categories) and by period: `month` + `year`
//! for monthly budgets, `year` for yearly ones, nothing for custom ones.

use super::sea_orm_active_enums::BudgetPeriod;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the budget
    pub user_id: i64,
    /// Category label to match, empty for all expense categories
    pub category: String,
    /// Spending limit, strictly positive
    pub amount: f64,
    /// Monthly, yearly or custom
    pub period: BudgetPeriod,
    /// Month (1-12) for monthly budgets
    pub month: Option<i32>,
    /// Year for monthly and yearly budgets
    pub year: Option<i32>,
    /// ISO currency code
    pub currency: String,
    /// Percentage (0-100) at which the budget is flagged as nearing its limit
    pub alert_threshold: i32,
    /// Optional free-text description
    pub description: Option<String>,
    /// When the budget was created
    pub created_at: DateTimeUtc,
    /// When the budget was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one user
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
