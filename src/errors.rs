//! Unified error type for the finance tracker.
//!
//! Every layer (config, core, api) returns [`Result`]. The HTTP layer maps each
//! variant to a status code in `api::error`.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input rejected before any state change
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },

    /// A record with the given id does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (`"Budget"`, `"Transaction"`, ...)
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// The record exists but belongs to someone else (or is global and read-only)
    #[error("Not authorized to modify {entity} {id}")]
    NotAuthorized {
        /// Kind of record
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// The request carries no usable caller identity
    #[error("Not authorized, no valid user")]
    Unauthenticated,

    /// A user with this e-mail is already registered
    #[error("User already exists: {email}")]
    DuplicateUser {
        /// The conflicting e-mail address
        email: String,
    },

    /// The store did not answer in time or the connection dropped
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// What was being attempted
        message: String,
    },

    /// Another worker already fired this recurring cycle
    #[error("Recurring definition {definition_id} was already advanced")]
    ConcurrentAdvance {
        /// The recurring definition whose cycle was already handled
        definition_id: i64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether retrying the same operation later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. }
                | Self::Database(sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_))
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
