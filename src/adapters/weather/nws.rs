//! National Weather Service forecast pipeline.
//!
//! Three dependent lookups, each a typed stage that short-circuits when an
//! expected field is absent:
//!
//! 1. `points/{lat},{lon}` - discover the gridpoint's forecast URLs
//! 2. the hourly forecast - daytime flag, temperature, short forecast,
//!    relative humidity from the first hourly period
//! 3. the grid-resolution forecast - sky cover, selected from the value
//!    whose validity window contains the current hour
//!
//! A validity window looks like `2024-03-05T13:00:00+00:00/PT6H`: a UTC
//! start plus a duration token. The window match applies the configured
//! UTC offset, comparing against day-of-month and hour the same way the
//! displays' clock does.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Timelike, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::domain::WeatherSnapshot;
use crate::ports::{WeatherError, WeatherProvider};

// ---- Stage response types -------------------------------------------------

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: Option<PointsProperties>,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    #[serde(rename = "forecastHourly")]
    forecast_hourly: Option<String>,
    #[serde(rename = "forecastGridData")]
    forecast_grid_data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    properties: Option<HourlyProperties>,
}

#[derive(Debug, Deserialize)]
struct HourlyProperties {
    #[serde(default)]
    periods: Vec<HourlyPeriod>,
}

#[derive(Debug, Deserialize)]
struct HourlyPeriod {
    #[serde(rename = "isDaytime")]
    is_daytime: bool,
    temperature: f64,
    #[serde(rename = "shortForecast")]
    short_forecast: String,
    #[serde(rename = "relativeHumidity", default)]
    relative_humidity: Option<UnitValue>,
}

#[derive(Debug, Deserialize)]
struct UnitValue {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GridResponse {
    properties: Option<GridProperties>,
}

#[derive(Debug, Deserialize)]
struct GridProperties {
    #[serde(rename = "skyCover")]
    sky_cover: Option<ValueSeries>,
}

#[derive(Debug, Deserialize)]
struct ValueSeries {
    #[serde(default)]
    values: Vec<TimedValue>,
}

#[derive(Debug, Deserialize)]
struct TimedValue {
    #[serde(rename = "validTime")]
    valid_time: String,
    value: f64,
}

// ---- Validity windows -----------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ForecastWindow {
    /// UTC day-of-month of the window start
    day: u32,
    /// UTC hour of the window start
    start_hour: i64,
    /// Window span in whole hours, from the `PT<n>H` token
    span_hours: i64,
}

impl ForecastWindow {
    /// Whether the window contains the given local day-of-month and hour,
    /// with `offset` converting the UTC start into local hours. Day
    /// arithmetic is by day-of-month only, as the consuming clock has
    /// always done it.
    fn contains(&self, now_day: u32, now_hour: i64, offset: i64) -> bool {
        let start = self.start_hour + (self.day as i64 - now_day as i64) * 24 + offset;
        now_hour >= start && now_hour < start + self.span_hours
    }
}

/// Parse `"YYYY-MM-DDTHH:MM:SS+00:00/PT<n>H"` into a window. Tokens without
/// an hour component are skipped.
fn parse_valid_time(valid_time: &str) -> Option<ForecastWindow> {
    let day: u32 = valid_time.get(8..10)?.parse().ok()?;
    let start_hour: i64 = valid_time.get(11..13)?.parse().ok()?;
    let pt = valid_time.find("PT")?;
    let h = valid_time[pt..].find('H')? + pt;
    let span_hours: i64 = valid_time.get(pt + 2..h)?.parse().ok()?;
    Some(ForecastWindow {
        day,
        start_hour,
        span_hours,
    })
}

/// Pick the sky-cover value whose window contains the current local hour.
fn select_sky_cover(values: &[TimedValue], now_day: u32, now_hour: i64, offset: i64) -> Option<f64> {
    values.iter().find_map(|timed| {
        parse_valid_time(&timed.valid_time)
            .filter(|window| window.contains(now_day, now_hour, offset))
            .map(|_| timed.value)
    })
}

// ---- Provider -------------------------------------------------------------

/// Weather provider backed by api.weather.gov.
pub struct NwsWeatherProvider {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    utc_offset_hours: i64,
}

impl NwsWeatherProvider {
    /// Build a provider from the weather configuration.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| WeatherError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            latitude: config.latitude,
            longitude: config.longitude,
            utc_offset_hours: config.utc_offset_hours,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WeatherError::Http(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Http(e.to_string()))
    }
}

#[async_trait]
impl WeatherProvider for NwsWeatherProvider {
    async fn fetch_snapshot(&self) -> Result<WeatherSnapshot, WeatherError> {
        // Stage 1: gridpoint discovery
        let points: PointsResponse = self
            .get_json(&format!(
                "{}/points/{},{}",
                self.base_url, self.latitude, self.longitude
            ))
            .await?;
        let points = points
            .properties
            .ok_or(WeatherError::MissingField("points properties"))?;
        let hourly_url = points
            .forecast_hourly
            .ok_or(WeatherError::MissingField("forecastHourly"))?;
        let grid_url = points
            .forecast_grid_data
            .ok_or(WeatherError::MissingField("forecastGridData"))?;

        // Stage 2: hourly forecast
        let hourly: HourlyResponse = self.get_json(&hourly_url).await?;
        let mut periods = hourly
            .properties
            .ok_or(WeatherError::MissingField("hourly properties"))?
            .periods;
        if periods.is_empty() {
            return Err(WeatherError::MissingField("hourly periods"));
        }
        let current = periods.remove(0);

        // Stage 3: grid-resolution sky cover
        let grid: GridResponse = self.get_json(&grid_url).await?;
        let values = grid
            .properties
            .ok_or(WeatherError::MissingField("grid properties"))?
            .sky_cover
            .ok_or(WeatherError::MissingField("skyCover"))?
            .values;

        let local_now = Utc::now() + chrono::Duration::hours(self.utc_offset_hours);
        let sky_cover = select_sky_cover(
            &values,
            local_now.day(),
            local_now.hour() as i64,
            self.utc_offset_hours,
        )
        .ok_or(WeatherError::NoMatchingWindow)?;

        Ok(WeatherSnapshot {
            is_daytime: current.is_daytime,
            temperature: current.temperature,
            short_forecast: current.short_forecast,
            relative_humidity: current.relative_humidity.and_then(|h| h.value),
            sky_cover,
        })
    }
}

impl std::fmt::Debug for NwsWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NwsWeatherProvider")
            .field("base_url", &self.base_url)
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .finish_non_exhaustive()
    }
}
