/// Application settings loaded from config.toml and the environment
pub mod app;

/// Database connection, table creation and seeding
pub mod database;

pub use app::{AppConfig, AuthConfig, CategoryConfig, load_app_configuration};
