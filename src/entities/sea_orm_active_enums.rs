//! String-backed enums shared by several entities.
//!
//! Stored as lowercase text so the database stays readable and the JSON
//! representation matches the stored value.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of money movement for transactions, categories and recurring definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out; the only kind that counts against budgets
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl TransactionKind {
    /// Lowercase label used in exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// Time scope of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// A single calendar month (`month` + `year` required)
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// A single calendar year (`year` required)
    #[sea_orm(string_value = "yearly")]
    Yearly,
    /// Free-form period with no bounds recorded
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl BudgetPeriod {
    /// Lowercase label used in exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }
}

/// How often a recurring definition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every seven days
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Every calendar month
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every calendar year
    #[sea_orm(string_value = "yearly")]
    Yearly,
}
