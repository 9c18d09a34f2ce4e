//! Application configuration module
//!
//! Provides type-safe configuration loading from environment variables using
//! the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ROOMCAST` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use roomcast::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server listening on {}", config.server.socket_addr());
//! ```

mod auth;
mod error;
mod server;
mod storage;
mod sync;
mod weather;

pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;
pub use storage::StorageConfig;
pub use sync::SyncConfig;
pub use weather::WeatherConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the roomcast service. Load using
/// [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Identity-store configuration (opaque token verification)
    pub auth: AuthConfig,

    /// Storage configuration (per-room document directory)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Synchronization configuration (heartbeat, rollover)
    #[serde(default)]
    pub sync: SyncConfig,

    /// Weather provider configuration (NWS gridpoint lookup)
    #[serde(default)]
    pub weather: WeatherConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `ROOMCAST` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ROOMCAST__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `ROOMCAST__STORAGE__DATA_DIR=files` -> `storage.data_dir = files`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROOMCAST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate()?;
        self.storage.validate()?;
        self.sync.validate()?;
        self.weather.validate()?;
        Ok(())
    }
}
