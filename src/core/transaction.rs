//! Transaction business logic - the ledger.
//!
//! This module provides functions for creating, listing, updating and deleting a
//! user's income/expense entries. Every function is scoped to an owner: records
//! belonging to someone else are reported as [`Error::NotAuthorized`], unknown ids
//! as [`Error::NotFound`]. Amounts are stored non-negative; direction comes from
//! the transaction kind.

use crate::{
    core::validation,
    entities::{Transaction, TransactionKind, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// A fully specified transaction to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Income or expense
    pub kind: TransactionKind,
    /// Category label
    pub category: String,
    /// Non-negative amount
    pub amount: f64,
    /// Calendar date
    pub date: NaiveDate,
    /// ISO currency code
    pub currency: String,
    /// Payment method label
    pub payment_method: String,
    /// Free-text description
    pub description: String,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionUpdate {
    /// New kind
    pub kind: Option<TransactionKind>,
    /// New category label
    pub category: Option<String>,
    /// New amount
    pub amount: Option<f64>,
    /// New date
    pub date: Option<NaiveDate>,
    /// New currency code
    pub currency: Option<String>,
    /// New payment method
    pub payment_method: Option<String>,
    /// New description
    pub description: Option<String>,
}

/// Optional filters for listing transactions. Empty filter returns everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionFilter {
    /// Only this kind
    pub kind: Option<TransactionKind>,
    /// Exact category label
    pub category: Option<String>,
    /// Exact payment method
    pub payment_method: Option<String>,
    /// Dates on or after
    pub from: Option<NaiveDate>,
    /// Dates on or before
    pub to: Option<NaiveDate>,
    /// Case-insensitive text matched against description, category and amount
    pub q: Option<String>,
}

impl TransactionFilter {
    fn matches_text(&self, tx: &transaction::Model) -> bool {
        let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        let needle = q.to_lowercase();
        tx.description.to_lowercase().contains(&needle)
            || tx.category.to_lowercase().contains(&needle)
            || tx.amount.to_string().contains(q)
    }
}

fn validate_new(input: NewTransaction) -> Result<NewTransaction> {
    Ok(NewTransaction {
        category: validation::non_empty("category", &input.category)?,
        amount: validation::non_negative_amount(input.amount)?,
        currency: validation::currency(&input.currency)?,
        payment_method: validation::non_empty("payment_method", &input.payment_method)?,
        description: input.description.trim().to_string(),
        ..input
    })
}

/// Records a new transaction for `user_id`.
#[instrument(skip(db, input), fields(kind = ?input.kind, amount = input.amount))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewTransaction,
    now: DateTime<Utc>,
) -> Result<transaction::Model> {
    let input = validate_new(input)?;

    let created = transaction::ActiveModel {
        user_id: Set(user_id),
        kind: Set(input.kind),
        category: Set(input.category),
        amount: Set(input.amount),
        date: Set(input.date),
        currency: Set(input.currency),
        payment_method: Set(input.payment_method),
        description: Set(input.description),
        recurring_id: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created transaction {} for user {}: {} {:.2} in '{}'",
        created.id,
        user_id,
        created.kind.as_str(),
        created.amount,
        created.category
    );
    Ok(created)
}

/// Every transaction of `user_id`, newest date first.
pub async fn list_by_owner<C>(db: &C, user_id: i64) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Transactions of `user_id` matching `filter`, newest date first.
///
/// Structured filters run in the database; the free-text query is applied
/// afterwards because it also matches the formatted amount.
pub async fn list_transactions<C>(
    db: &C,
    user_id: i64,
    filter: &TransactionFilter,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Transaction::find().filter(transaction::Column::UserId.eq(user_id));
    if let Some(kind) = filter.kind {
        query = query.filter(transaction::Column::Kind.eq(kind));
    }
    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        query = query.filter(transaction::Column::Category.eq(category));
    }
    if let Some(method) = filter.payment_method.as_deref().filter(|m| !m.is_empty()) {
        query = query.filter(transaction::Column::PaymentMethod.eq(method));
    }
    if let Some(from) = filter.from {
        query = query.filter(transaction::Column::Date.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(transaction::Column::Date.lte(to));
    }

    let rows = query
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await?;

    let matching: Vec<_> = rows.into_iter().filter(|tx| filter.matches_text(tx)).collect();
    debug!("Listed {} transactions for user {}", matching.len(), user_id);
    Ok(matching)
}

/// Fetches a transaction owned by `user_id`.
pub async fn get_owned_transaction<C>(
    db: &C,
    user_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    let tx = Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Transaction",
            id: transaction_id,
        })?;
    if tx.user_id != user_id {
        return Err(Error::NotAuthorized {
            entity: "Transaction",
            id: transaction_id,
        });
    }
    Ok(tx)
}

/// Applies `update` to a transaction owned by `user_id`.
#[instrument(skip(db, update))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    transaction_id: i64,
    update: TransactionUpdate,
) -> Result<transaction::Model> {
    let existing = get_owned_transaction(db, user_id, transaction_id).await?;
    let mut active: transaction::ActiveModel = existing.into();

    if let Some(kind) = update.kind {
        active.kind = Set(kind);
    }
    if let Some(category) = update.category {
        active.category = Set(validation::non_empty("category", &category)?);
    }
    if let Some(amount) = update.amount {
        active.amount = Set(validation::non_negative_amount(amount)?);
    }
    if let Some(date) = update.date {
        active.date = Set(date);
    }
    if let Some(currency) = update.currency {
        active.currency = Set(validation::currency(&currency)?);
    }
    if let Some(method) = update.payment_method {
        active.payment_method = Set(validation::non_empty("payment_method", &method)?);
    }
    if let Some(description) = update.description {
        active.description = Set(description.trim().to_string());
    }

    let updated = active.update(db).await?;
    info!("Updated transaction {} for user {}", transaction_id, user_id);
    Ok(updated)
}

/// Deletes a transaction owned by `user_id`.
#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    transaction_id: i64,
) -> Result<()> {
    let existing = get_owned_transaction(db, user_id, transaction_id).await?;
    existing.delete(db).await?;
    info!("Deleted transaction {} for user {}", transaction_id, user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let mut input = new_expense("Food", 10.0, date(2024, 6, 1));
        input.amount = -5.0;
        assert!(matches!(
            create_transaction(&db, user.id, input, test_now()).await,
            Err(Error::Validation { field: "amount", .. })
        ));

        let mut input = new_expense("Food", 10.0, date(2024, 6, 1));
        input.amount = f64::NAN;
        assert!(create_transaction(&db, user.id, input, test_now()).await.is_err());

        let input = new_expense("   ", 10.0, date(2024, 6, 1));
        assert!(matches!(
            create_transaction(&db, user.id, input, test_now()).await,
            Err(Error::Validation { field: "category", .. })
        ));

        assert!(Transaction::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_amount_is_allowed() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let created =
            create_transaction(&db, user.id, new_expense("Food", 0.0, date(2024, 6, 1)), test_now())
                .await?;
        assert_eq!(created.amount, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_newest_first() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let other = create_test_user(&db, "other@example.com").await?;

        create_test_expense(&db, user.id, "Food", 10.0, date(2024, 6, 1)).await?;
        create_test_expense(&db, user.id, "Rent", 500.0, date(2024, 6, 3)).await?;
        create_test_expense(&db, other.id, "Food", 99.0, date(2024, 6, 2)).await?;

        let listed = list_by_owner(&db, user.id).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].category, "Rent");
        assert_eq!(listed[1].category, "Food");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        create_test_expense(&db, user.id, "Food", 12.5, date(2024, 5, 30)).await?;
        create_test_expense(&db, user.id, "Food", 40.0, date(2024, 6, 10)).await?;
        create_test_income(&db, user.id, "Salary", 3000.0, date(2024, 6, 1)).await?;
        let mut card = new_expense("Travel", 75.0, date(2024, 6, 15));
        card.payment_method = "card".to_string();
        card.description = "Train to Lahore".to_string();
        create_transaction(&db, user.id, card, test_now()).await?;

        let expenses = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(expenses.len(), 3);

        let june_food = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                category: Some("Food".to_string()),
                from: Some(date(2024, 6, 1)),
                to: Some(date(2024, 6, 30)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(june_food.len(), 1);
        assert_eq!(june_food[0].amount, 40.0);

        let by_method = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                payment_method: Some("card".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_method.len(), 1);

        let by_text = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                q: Some("lahore".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].category, "Travel");

        let by_amount = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                q: Some("12.5".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_amount.len(), 1);

        let padded = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                q: Some(" 12.5 ".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(padded.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let tx = create_test_expense(&db, user.id, "Food", 10.0, date(2024, 6, 1)).await?;

        let updated = update_transaction(
            &db,
            user.id,
            tx.id,
            TransactionUpdate {
                amount: Some(15.0),
                category: Some("Groceries".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.amount, 15.0);
        assert_eq!(updated.category, "Groceries");
        assert_eq!(updated.date, tx.date);

        let rejected = update_transaction(
            &db,
            user.id,
            tx.id,
            TransactionUpdate {
                amount: Some(-1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(rejected, Err(Error::Validation { .. })));
        assert_eq!(get_owned_transaction(&db, user.id, tx.id).await?.amount, 15.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_ownership_checks() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let other = create_test_user(&db, "other@example.com").await?;
        let tx = create_test_expense(&db, user.id, "Food", 10.0, date(2024, 6, 1)).await?;

        assert!(matches!(
            update_transaction(&db, other.id, tx.id, TransactionUpdate::default()).await,
            Err(Error::NotAuthorized { .. })
        ));
        assert!(matches!(
            delete_transaction(&db, other.id, tx.id).await,
            Err(Error::NotAuthorized { .. })
        ));
        assert!(matches!(
            delete_transaction(&db, user.id, 999).await,
            Err(Error::NotFound { entity: "Transaction", id: 999 })
        ));

        delete_transaction(&db, user.id, tx.id).await?;
        assert!(list_by_owner(&db, user.id).await?.is_empty());
        Ok(())
    }
}
