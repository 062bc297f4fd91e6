//! User business logic - registration and profile lookup.

use crate::{
    core::validation,
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument};

/// Registers a new user.
///
/// The e-mail is trimmed and lower-cased before the uniqueness check.
#[instrument(skip(db, name))]
pub async fn register_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    currency: &str,
    now: DateTime<Utc>,
) -> Result<user::Model> {
    let name = validation::non_empty("name", name)?;
    let email = validation::non_empty("email", email)?.to_lowercase();
    if !email.contains('@') {
        return Err(Error::validation("email", "must be an e-mail address"));
    }
    let currency = validation::currency(currency)?;

    let exists = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if exists.is_some() {
        return Err(Error::DuplicateUser { email });
    }

    let created = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        currency: Set(currency),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Registered user {} <{}>", created.id, created.email);
    Ok(created)
}

/// Fetches a user by id.
pub async fn get_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "User",
            id: user_id,
        })
}
