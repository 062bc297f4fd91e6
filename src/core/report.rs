//! Reporting business logic - totals, monthly chart buckets and CSV exports.
//!
//! The pure functions work on already loaded rows so the HTTP layer can export
//! exactly the list it filtered. The async wrappers load a user's ledger first.

use crate::{
    core::transaction::list_by_owner,
    entities::{TransactionKind, budget, transaction},
    errors::Result,
};
use chrono::Datelike;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::io::{self, Write};

/// Header row of the transaction export
pub const TRANSACTIONS_HEADER: [&str; 7] = [
    "Type",
    "Category",
    "Amount",
    "Date",
    "PaymentMethod",
    "Currency",
    "Description",
];

/// Header row of the budget export
pub const BUDGETS_HEADER: [&str; 8] = [
    "Category",
    "Type",
    "Amount",
    "Month",
    "Year",
    "Currency",
    "AlertThreshold",
    "Description",
];

/// Income/expense totals over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary {
    /// Sum of all income
    pub total_income: f64,
    /// Sum of all expenses
    pub total_expense: f64,
    /// `total_income - total_expense`
    pub balance: f64,
}

/// Per-month totals of one calendar year, January first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    /// The year the buckets cover
    pub year: i32,
    /// Income per month
    pub income: [f64; 12],
    /// Expenses per month
    pub expense: [f64; 12],
}

/// Sums income and expenses.
#[must_use]
pub fn summarize_totals(transactions: &[transaction::Model]) -> StatsSummary {
    let (total_income, total_expense) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expense), tx| match tx.kind {
                TransactionKind::Income => (income + tx.amount, expense),
                TransactionKind::Expense => (income, expense + tx.amount),
            });
    StatsSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }
}

/// Buckets the transactions dated in `year` by month.
#[must_use]
pub fn monthly_totals(transactions: &[transaction::Model], year: i32) -> MonthlyTotals {
    let mut totals = MonthlyTotals {
        year,
        income: [0.0; 12],
        expense: [0.0; 12],
    };
    for tx in transactions.iter().filter(|tx| tx.date.year() == year) {
        let slot = tx.date.month0() as usize;
        match tx.kind {
            TransactionKind::Income => totals.income[slot] += tx.amount,
            TransactionKind::Expense => totals.expense[slot] += tx.amount,
        }
    }
    totals
}

/// Totals over the whole ledger of `user_id`.
pub async fn stats_summary<C>(db: &C, user_id: i64) -> Result<StatsSummary>
where
    C: ConnectionTrait,
{
    Ok(summarize_totals(&list_by_owner(db, user_id).await?))
}

/// Monthly buckets of `year` for `user_id`.
pub async fn monthly_stats<C>(db: &C, user_id: i64, year: i32) -> Result<MonthlyTotals>
where
    C: ConnectionTrait,
{
    Ok(monthly_totals(&list_by_owner(db, user_id).await?, year))
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// Writes transactions as CSV, every field quoted.
pub fn write_transactions_csv<W: Write>(
    transactions: &[transaction::Model],
    writer: W,
) -> Result<()> {
    let mut csv = csv_writer(writer);
    csv.write_record(TRANSACTIONS_HEADER)?;
    for tx in transactions {
        csv.write_record([
            tx.kind.as_str(),
            tx.category.as_str(),
            tx.amount.to_string().as_str(),
            tx.date.format("%Y-%m-%d").to_string().as_str(),
            tx.payment_method.as_str(),
            tx.currency.as_str(),
            tx.description.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes budgets as CSV, every field quoted. An empty category is shown as `All`.
pub fn write_budgets_csv<W: Write>(budgets: &[budget::Model], writer: W) -> Result<()> {
    let mut csv = csv_writer(writer);
    csv.write_record(BUDGETS_HEADER)?;
    for b in budgets {
        let category = if b.category.is_empty() {
            "All"
        } else {
            b.category.as_str()
        };
        csv.write_record([
            category,
            b.period.as_str(),
            b.amount.to_string().as_str(),
            b.month.map(|m| m.to_string()).unwrap_or_default().as_str(),
            b.year.map(|y| y.to_string()).unwrap_or_default().as_str(),
            b.currency.as_str(),
            b.alert_threshold.to_string().as_str(),
            b.description.as_deref().unwrap_or(""),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Renders the transaction export into a string.
pub fn transactions_csv(transactions: &[transaction::Model]) -> Result<String> {
    let mut buf = Vec::new();
    write_transactions_csv(transactions, &mut buf)?;
    into_string(buf)
}

/// Renders the budget export into a string.
pub fn budgets_csv(budgets: &[budget::Model]) -> Result<String> {
    let mut buf = Vec::new();
    write_budgets_csv(budgets, &mut buf)?;
    into_string(buf)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::BudgetPeriod;
    use crate::test_utils::*;

    fn income(id: i64, amount: f64, on: chrono::NaiveDate) -> transaction::Model {
        let mut tx = expense_model(id, "Salary", amount, on);
        tx.kind = TransactionKind::Income;
        tx
    }

    #[test]
    fn test_summarize_totals() {
        let txs = vec![
            income(1, 3000.0, date(2024, 6, 1)),
            expense_model(2, "Rent", 1200.0, date(2024, 6, 2)),
            expense_model(3, "Food", 300.5, date(2024, 6, 3)),
        ];
        let summary = summarize_totals(&txs);
        assert_eq!(summary.total_income, 3000.0);
        assert_eq!(summary.total_expense, 1500.5);
        assert_eq!(summary.balance, 1499.5);

        let empty = summarize_totals(&[]);
        assert_eq!(empty.balance, 0.0);
    }

    #[test]
    fn test_summary_json_keys() {
        let json = serde_json::to_value(summarize_totals(&[income(1, 10.0, date(2024, 1, 1))]))
            .unwrap();
        assert_eq!(json["total_income"], 10.0);
        assert_eq!(json["total_expense"], 0.0);
        assert_eq!(json["balance"], 10.0);
    }

    #[test]
    fn test_monthly_totals_only_cover_requested_year() {
        let txs = vec![
            income(1, 3000.0, date(2024, 1, 31)),
            expense_model(2, "Rent", 1200.0, date(2024, 1, 1)),
            expense_model(3, "Food", 50.0, date(2024, 12, 31)),
            expense_model(4, "Food", 999.0, date(2023, 12, 31)),
        ];
        let totals = monthly_totals(&txs, 2024);
        assert_eq!(totals.year, 2024);
        assert_eq!(totals.income[0], 3000.0);
        assert_eq!(totals.expense[0], 1200.0);
        assert_eq!(totals.expense[11], 50.0);
        assert_eq!(totals.expense.iter().sum::<f64>(), 1250.0);
    }

    #[test]
    fn test_transactions_csv_quotes_every_field() {
        let mut tx = expense_model(1, "Food", 12.5, date(2024, 6, 1));
        tx.description = "Lunch, \"fancy\"".to_string();
        let csv = transactions_csv(&[tx]).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            r#""Type","Category","Amount","Date","PaymentMethod","Currency","Description""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""expense","Food","12.5","2024-06-01","cash","USD","Lunch, ""fancy""""#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_budgets_csv_shows_all_for_empty_category() {
        let budgets = vec![
            budget_model(1, "", 500.0, BudgetPeriod::Monthly, Some(6), Some(2024)),
            budget_model(2, "Trip", 900.0, BudgetPeriod::Custom, None, None),
        ];
        let csv = budgets_csv(&budgets).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            r#""All","monthly","500","6","2024","USD","80","""#
        );
        assert_eq!(lines[2], r#""Trip","custom","900","","","USD","80","""#);
    }

    #[tokio::test]
    async fn test_stats_are_owner_scoped() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let other = create_test_user(&db, "other@example.com").await?;
        create_test_income(&db, user.id, "Salary", 100.0, date(2024, 3, 1)).await?;
        create_test_expense(&db, user.id, "Food", 40.0, date(2024, 3, 2)).await?;
        create_test_expense(&db, other.id, "Food", 1000.0, date(2024, 3, 2)).await?;

        let summary = stats_summary(&db, user.id).await?;
        assert_eq!(summary.balance, 60.0);

        let monthly = monthly_stats(&db, user.id, 2024).await?;
        assert_eq!(monthly.income[2], 100.0);
        assert_eq!(monthly.expense[2], 40.0);
        Ok(())
    }
}
