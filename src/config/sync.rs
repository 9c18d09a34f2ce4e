//! Synchronization configuration (heartbeat and daily rollover)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Connection and rollover timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Seconds between heartbeat probes on each connection. A connection
    /// that has not acknowledged the previous probe when the next one is
    /// due is treated as dead.
    #[serde(default = "default_heartbeat_seconds")]
    pub heartbeat_seconds: u64,
}

impl SyncConfig {
    /// Heartbeat period as a [`Duration`]
    pub fn heartbeat_period(&self) -> Duration {
        Duration::from_secs(self.heartbeat_seconds)
    }

    /// Validate synchronization configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.heartbeat_seconds == 0 {
            return Err(ValidationError::InvalidHeartbeat);
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            heartbeat_seconds: default_heartbeat_seconds(),
        }
    }
}

fn default_heartbeat_seconds() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.heartbeat_period(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_heartbeat_rejected() {
        let config = SyncConfig {
            heartbeat_seconds: 0,
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidHeartbeat)
        ));
    }
}
