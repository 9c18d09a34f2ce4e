//! Weather provider configuration (api.weather.gov)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Weather provider configuration
///
/// The refresh loop runs the gridpoint -> hourly -> grid-data pipeline at a
/// fixed sub-hourly period and stores one process-wide snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// NWS API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Gridpoint latitude
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Gridpoint longitude
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Minutes between refresh cycles
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,

    /// Offset in hours applied to UTC forecast windows when matching the
    /// current hour (the displays' local timezone)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i64,

    /// User-Agent header required by the NWS API
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl WeatherConfig {
    /// Refresh period as a [`Duration`]
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_minutes * 60)
    }

    /// Validate weather configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.refresh_minutes == 0 || self.refresh_minutes > 59 {
            return Err(ValidationError::InvalidRefreshPeriod);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::InvalidLatitude);
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::InvalidLongitude);
        }
        Ok(())
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            refresh_minutes: default_refresh_minutes(),
            utc_offset_hours: default_utc_offset(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_latitude() -> f64 {
    41.7676
}

fn default_longitude() -> f64 {
    -88.1557
}

fn default_refresh_minutes() -> u64 {
    30
}

fn default_utc_offset() -> i64 {
    -5
}

fn default_user_agent() -> String {
    "roomcast (display-sync service)".to_string()
}
