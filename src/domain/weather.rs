//! The process-wide weather snapshot.

use serde::{Deserialize, Serialize};

/// Weather state shared by every room's broadcast.
///
/// Field names follow the wire shape the displays already render. The
/// snapshot is refreshed as a whole; there is no per-field update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "isDaytime")]
    pub is_daytime: bool,
    pub temperature: f64,
    #[serde(rename = "shortForecast")]
    pub short_forecast: String,
    #[serde(rename = "relativeHumidityValue")]
    pub relative_humidity: Option<f64>,
    #[serde(rename = "skyCover")]
    pub sky_cover: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names() {
        let snapshot = WeatherSnapshot {
            is_daytime: true,
            temperature: 72.0,
            short_forecast: "Partly Cloudy".to_string(),
            relative_humidity: Some(40.0),
            sky_cover: 25.0,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["isDaytime"], true);
        assert_eq!(json["shortForecast"], "Partly Cloudy");
        assert_eq!(json["relativeHumidityValue"], 40.0);
        assert_eq!(json["skyCover"], 25.0);
    }
}
