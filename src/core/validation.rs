//! Input checks shared by the core modules.
//!
//! Each check names the field it guards so the caller can report it.

use crate::errors::{Error, Result};

/// Rejects empty or whitespace-only text and returns it trimmed.
pub fn non_empty(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Transactions and recurring templates: finite and `>= 0`.
pub fn non_negative_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() {
        return Err(Error::validation("amount", "must be a valid number"));
    }
    if amount < 0.0 {
        return Err(Error::validation("amount", "cannot be negative"));
    }
    Ok(amount)
}

/// Budgets: finite and `> 0`.
pub fn positive_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() {
        return Err(Error::validation("amount", "must be a valid number"));
    }
    if amount <= 0.0 {
        return Err(Error::validation("amount", "must be greater than zero"));
    }
    Ok(amount)
}

/// Three-letter alphabetic code, upper-cased.
pub fn currency(value: &str) -> Result<String> {
    let code = value.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::validation(
            "currency",
            format!("{value:?} is not a three-letter currency code"),
        ));
    }
    Ok(code)
}
