//! Application configuration loading from config.toml
//!
//! Every section is optional; missing keys fall back to defaults so the server
//! can start without a config file. A handful of environment variables
//! (`DATABASE_URL`, `HOST`, `PORT`, `DEFAULT_CURRENCY`, `PROXY_SECRET`) override
//! the file.

use crate::entities::TransactionKind;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Recurrence worker settings
    pub recurrence: RecurrenceConfig,
    /// Defaults applied to new records
    pub defaults: DefaultsConfig,
    /// Trust settings for the upstream authentication proxy
    pub auth: AuthConfig,
    /// Global categories to seed
    pub categories: Vec<CategoryConfig>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SeaORM connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/finance_buddy.sqlite?mode=rwc".to_string(),
        }
    }
}

/// Recurrence worker settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecurrenceConfig {
    /// Seconds between two due-checks of the background worker
    pub interval_secs: u64,
    /// Upper bound for one store round trip (insert + advance)
    pub store_timeout_ms: u64,
    /// Maximum cycles materialized for one definition in a single run
    pub max_cycles_per_run: u32,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            store_timeout_ms: 5_000,
            max_cycles_per_run: 366,
        }
    }
}

impl RecurrenceConfig {
    /// Interval between two worker ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Timeout applied to each store round trip.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

/// Defaults applied to new records
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Currency used when a request does not name one
    pub currency: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
        }
    }
}

/// Trust settings for the upstream authentication proxy
///
/// Identity headers are only honoured on requests that carry this secret. Without
/// a secret every user-scoped request is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret the proxy sends in `x-proxy-secret`
    pub proxy_secret: Option<String>,
}

/// Configuration for a single global category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// `income` or `expense`
    pub kind: TransactionKind,
    /// Optional display colour
    #[serde(default)]
    pub color: Option<String>,
}

/// Loads the configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    validate(&config)?;
    Ok(config)
}

/// Loads configuration from `CONFIG_PATH` (or `./config.toml`), falling back to
/// defaults when the file does not exist, then applies environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        warn!("Config file {} not found, using defaults", path);
        AppConfig::default()
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Applies environment overrides using the provided lookup.
///
/// The lookup is injected so overrides can be tested without touching the
/// process environment.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port.parse().map_err(|e| Error::Config {
            message: format!("Invalid PORT {port:?}: {e}"),
        })?;
    }
    if let Some(currency) = lookup("DEFAULT_CURRENCY") {
        config.defaults.currency = currency;
    }
    if let Some(secret) = lookup("PROXY_SECRET") {
        config.auth.proxy_secret = Some(secret);
    }
    validate(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.recurrence.interval_secs == 0 {
        return Err(Error::Config {
            message: "recurrence.interval_secs must be greater than zero".to_string(),
        });
    }
    if config.recurrence.store_timeout_ms == 0 {
        return Err(Error::Config {
            message: "recurrence.store_timeout_ms must be greater than zero".to_string(),
        });
    }
    if config.recurrence.max_cycles_per_run == 0 {
        return Err(Error::Config {
            message: "recurrence.max_cycles_per_run must be greater than zero".to_string(),
        });
    }
    if config
        .auth
        .proxy_secret
        .as_deref()
        .is_some_and(|secret| secret.trim().is_empty())
    {
        return Err(Error::Config {
            message: "auth.proxy_secret cannot be empty".to_string(),
        });
    }
    if config.defaults.currency.trim().is_empty() {
        return Err(Error::Config {
            message: "defaults.currency cannot be empty".to_string(),
        });
    }
    Ok(())
}
