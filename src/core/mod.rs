//! Core layer - framework-agnostic business logic.
//!
//! Functions here take a database connection (and, where time matters, an
//! explicit `now` or a [`clock::Clock`]) and return [`crate::errors::Result`].
//! The HTTP layer only translates requests into these calls.

/// Budget registry
pub mod budget;
/// Category management, own plus global
pub mod category;
/// Injected time source
pub mod clock;
/// Materializer turning due recurring definitions into ledger entries
pub mod recurrence;
/// Recurring definition management
pub mod recurring;
/// Totals, monthly buckets and CSV exports
pub mod report;
/// Frequency arithmetic with end-of-month clamping
pub mod schedule;
/// Budget versus spend aggregation
pub mod spend;
/// The ledger
pub mod transaction;
/// Registration and profile lookup
pub mod user;
/// Shared input checks
pub mod validation;
