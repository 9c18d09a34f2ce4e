//! WeatherProvider port - the chained forecast lookup.

use async_trait::async_trait;

use crate::domain::WeatherSnapshot;

/// Errors from the weather pipeline.
///
/// All of them degrade silently at the call site: the previous snapshot
/// stays in place and the next refresh cycle tries again.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Http(String),

    /// A stage's response was missing an expected field; the pipeline
    /// short-circuits to "no update"
    #[error("Weather response missing {0}")]
    MissingField(&'static str),

    /// No forecast-grid window contained the current hour
    #[error("No forecast window matched the current hour")]
    NoMatchingWindow,
}

/// Port for refreshing the process-wide weather snapshot.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Run the full lookup and produce a fresh snapshot.
    async fn fetch_snapshot(&self) -> Result<WeatherSnapshot, WeatherError>;
}
