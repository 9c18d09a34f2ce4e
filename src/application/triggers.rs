//! The two periodic triggers: daily rollover and weather refresh.
//!
//! They share nothing beyond the registry and coordinator they act on. The
//! rollover re-resolves every room at local midnight (which also runs the
//! resolver's lazy override purge); the weather refresh replaces the
//! process-wide snapshot on a fixed sub-hourly period and then broadcasts
//! every room whether or not the snapshot changed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::ports::WeatherProvider;

use super::broadcast::{BroadcastCoordinator, SharedWeather};
use super::registry::RoomRegistry;
use super::resolver::ScheduleResolver;

/// Spawns and runs the periodic triggers.
pub struct SchedulerTriggers {
    registry: Arc<RoomRegistry>,
    resolver: Arc<ScheduleResolver>,
    broadcast: Arc<BroadcastCoordinator>,
    provider: Arc<dyn WeatherProvider>,
    weather: SharedWeather,
    refresh_period: Duration,
}

impl SchedulerTriggers {
    pub fn new(
        registry: Arc<RoomRegistry>,
        resolver: Arc<ScheduleResolver>,
        broadcast: Arc<BroadcastCoordinator>,
        provider: Arc<dyn WeatherProvider>,
        weather: SharedWeather,
        refresh_period: Duration,
    ) -> Self {
        Self {
            registry,
            resolver,
            broadcast,
            provider,
            weather,
            refresh_period,
        }
    }

    /// Spawn both trigger loops onto the runtime.
    pub fn spawn(self: &Arc<Self>) {
        let rollover = Arc::clone(self);
        tokio::spawn(async move { rollover.rollover_loop().await });

        let refresh = Arc::clone(self);
        tokio::spawn(async move { refresh.weather_loop().await });
    }

    async fn rollover_loop(self: Arc<Self>) {
        loop {
            let wait = duration_until_next_midnight(Local::now());
            tracing::debug!(seconds = wait.as_secs(), "sleeping until daily rollover");
            tokio::time::sleep(wait).await;
            self.rollover_once().await;
        }
    }

    /// One rollover pass: re-resolve every room for the new day, then
    /// broadcast to the rooms somebody is actually watching.
    pub async fn rollover_once(&self) {
        let today = Local::now().date_naive();
        tracing::info!(date = %today, "daily rollover");
        for room in self.registry.rooms() {
            let periods = self.resolver.resolve(&room, today).await;
            self.registry.set_resolved(room.as_str(), periods);
            if self.registry.has_subscribers(room.as_str()) {
                self.broadcast.broadcast(&room).await;
            }
        }
    }

    async fn weather_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.refresh_period);
        loop {
            interval.tick().await;
            // fire-and-forget: a slow lookup may overlap the next cycle,
            // which is fine because the snapshot write is last-wins
            let this = Arc::clone(&self);
            tokio::spawn(async move { this.refresh_weather_once().await });
        }
    }

    /// One refresh pass: run the pipeline, store the snapshot, broadcast
    /// every room unconditionally.
    pub async fn refresh_weather_once(&self) {
        match self.provider.fetch_snapshot().await {
            Ok(snapshot) => {
                tracing::debug!(
                    temperature = snapshot.temperature,
                    forecast = %snapshot.short_forecast,
                    "weather snapshot refreshed"
                );
                if let Ok(mut guard) = self.weather.write() {
                    *guard = Some(snapshot);
                }
                for room in self.registry.rooms() {
                    self.broadcast.broadcast(&room).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "weather refresh failed; keeping previous snapshot");
            }
        }
    }
}

/// Time remaining until the next local midnight. Falls back to a full day
/// if the calendar arithmetic has nowhere to go.
fn duration_until_next_midnight(now: DateTime<Local>) -> Duration {
    now.date_naive()
        .succ_opt()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| {
            midnight
                .signed_duration_since(now.naive_local())
                .to_std()
                .ok()
        })
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}
