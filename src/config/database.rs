//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.

use crate::config::app::CategoryConfig;
use crate::entities::{Budget, Category, RecurringTransaction, Transaction, User, category};
use crate::errors::Result;
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Schema, Set,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Directory holding the database file of a `sqlite://path?options` URL.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates all tables that do not exist yet.
///
/// Users are created first because every other table references them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements: [TableCreateStatement; 5] = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(Budget),
        schema.create_table_from_entity(RecurringTransaction),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(builder.build(&statement)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}

/// Inserts the configured global categories that are not present yet.
///
/// A global category is identified by `(name, kind)` with no owner; existing rows
/// are left untouched.
#[instrument(skip(db, categories))]
pub async fn seed_global_categories(
    db: &DatabaseConnection,
    categories: &[CategoryConfig],
) -> Result<usize> {
    let mut inserted = 0;
    for cfg in categories {
        let existing = Category::find()
            .filter(category::Column::UserId.is_null())
            .filter(category::Column::Name.eq(cfg.name.as_str()))
            .filter(category::Column::Kind.eq(cfg.kind))
            .one(db)
            .await?;

        if existing.is_some() {
            debug!("Global category '{}' already exists, skipping", cfg.name);
            continue;
        }

        category::ActiveModel {
            user_id: Set(None),
            name: Set(cfg.name.clone()),
            kind: Set(cfg.kind),
            color: Set(cfg.color.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    info!("Seeded {} global categories", inserted);
    Ok(inserted)
}
