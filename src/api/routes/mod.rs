//! Route handlers organized by resource.

/// Banner and health check
pub mod general;

/// Registration and profile
pub mod users;

/// Ledger CRUD, stats and export
pub mod transactions;

/// Category CRUD
pub mod categories;

/// Budget CRUD, progress and export
pub mod budgets;

/// Recurring definition CRUD and on-demand materialization
pub mod recurring;
