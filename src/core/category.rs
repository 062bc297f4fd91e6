//! Category business logic.
//!
//! Users see their own categories plus the global ones. Global categories are
//! read-only: modifying one is reported as [`Error::NotAuthorized`].

use crate::{
    core::validation,
    entities::{Category, TransactionKind, category},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Partial update of a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryUpdate {
    /// New name
    pub name: Option<String>,
    /// New kind
    pub kind: Option<TransactionKind>,
    /// New colour
    pub color: Option<String>,
}

/// Categories visible to `user_id`: their own and all global ones, by name.
pub async fn list_visible_categories(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(
            Condition::any()
                .add(category::Column::UserId.eq(user_id))
                .add(category::Column::UserId.is_null()),
        )
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a category owned by `user_id`.
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    kind: TransactionKind,
    color: Option<String>,
) -> Result<category::Model> {
    let name = validation::non_empty("name", name)?;
    let created = category::ActiveModel {
        user_id: Set(Some(user_id)),
        name: Set(name),
        kind: Set(kind),
        color: Set(color),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created category '{}' for user {}", created.name, user_id);
    Ok(created)
}

async fn get_owned_category(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
) -> Result<category::Model> {
    let found = Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Category",
            id: category_id,
        })?;
    if found.user_id != Some(user_id) {
        return Err(Error::NotAuthorized {
            entity: "Category",
            id: category_id,
        });
    }
    Ok(found)
}

/// Updates a category owned by `user_id`.
#[instrument(skip(db, update))]
pub async fn update_category(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
    update: CategoryUpdate,
) -> Result<category::Model> {
    let mut active: category::ActiveModel =
        get_owned_category(db, user_id, category_id).await?.into();
    if let Some(name) = update.name {
        active.name = Set(validation::non_empty("name", &name)?);
    }
    if let Some(kind) = update.kind {
        active.kind = Set(kind);
    }
    if let Some(color) = update.color {
        active.color = Set(Some(color));
    }
    let updated = active.update(db).await?;
    info!("Updated category {} for user {}", category_id, user_id);
    Ok(updated)
}

/// Deletes a category owned by `user_id`. Transactions keep their label.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, user_id: i64, category_id: i64) -> Result<()> {
    get_owned_category(db, user_id, category_id)
        .await?
        .delete(db)
        .await?;
    info!("Deleted category {} for user {}", category_id, user_id);
    Ok(())
}
