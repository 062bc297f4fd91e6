//! API layer - the HTTP interface.
//!
//! Handlers translate requests into calls to [`crate::core`] and serialize the
//! results. Every resource route is scoped to the caller identified by
//! [`auth::CurrentUser`].

/// Caller identity extraction
pub mod auth;
/// Error to response mapping
pub mod error;
/// Route handlers per resource
pub mod routes;

use crate::{
    config::AppConfig,
    core::clock::Clock,
};
use axum::Router;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all store operations
    pub db: DatabaseConnection,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Time source for defaults and due-checks
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates the state shared by every request.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { db, config, clock }
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::general::routes())
        .merge(routes::users::routes())
        .merge(routes::transactions::routes())
        .merge(routes::categories::routes())
        .merge(routes::budgets::routes())
        .merge(routes::recurring::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
