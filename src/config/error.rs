//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Identity URL must be http(s)")]
    InvalidIdentityUrl,

    #[error("Storage data directory cannot be empty")]
    EmptyDataDir,

    #[error("Heartbeat period must be at least 1 second")]
    InvalidHeartbeat,

    #[error("Weather refresh period must be between 1 and 59 minutes")]
    InvalidRefreshPeriod,

    #[error("Latitude must be between -90 and 90")]
    InvalidLatitude,

    #[error("Longitude must be between -180 and 180")]
    InvalidLongitude,
}
