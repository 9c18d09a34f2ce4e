//! Snapshot composition and fan-out.

use std::sync::{Arc, RwLock};

use crate::domain::foundation::RoomName;
use crate::domain::{RoomSnapshot, WeatherSnapshot};
use crate::ports::RoomStore;

use super::registry::{OutboundFrame, OutboundSender, RoomRegistry};

/// The process-wide weather snapshot, shared by every room's broadcast.
/// `None` until the first successful refresh.
pub type SharedWeather = Arc<RwLock<Option<WeatherSnapshot>>>;

/// Composes a room's current snapshot and pushes it to subscribers.
pub struct BroadcastCoordinator {
    registry: Arc<RoomRegistry>,
    store: Arc<dyn RoomStore>,
    weather: SharedWeather,
}

impl BroadcastCoordinator {
    pub fn new(
        registry: Arc<RoomRegistry>,
        store: Arc<dyn RoomStore>,
        weather: SharedWeather,
    ) -> Self {
        Self {
            registry,
            store,
            weather,
        }
    }

    /// Compose `{schedule, layout, weather}` for a room.
    ///
    /// The schedule comes from the registry's resolved cache (mutating
    /// paths re-resolve before broadcasting); the layout is the active slot
    /// of the room's layout document. A layout read failure is logged and
    /// yields `None` - the push is skipped, nothing is surfaced.
    pub async fn compose(&self, room: &RoomName) -> Option<RoomSnapshot> {
        let layout = match self.store.load_layout(room).await {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(room = %room, error = %e, "layout read failed; skipping push");
                return None;
            }
        };

        Some(RoomSnapshot {
            schedule: self.registry.resolved(room.as_str()),
            layout: layout.active_slot().clone(),
            weather: self.current_weather(),
        })
    }

    /// Push the room's snapshot to every live subscriber.
    ///
    /// Fan-out iterates a point-in-time copy of the subscriber set; a
    /// subscriber that closed mid-broadcast is skipped, never an error.
    pub async fn broadcast(&self, room: &RoomName) {
        let Some(snapshot) = self.compose(room).await else {
            return;
        };
        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(room = %room, error = %e, "snapshot serialization failed");
                return;
            }
        };

        let targets = self.registry.subscriber_snapshot(room.as_str());
        let total = targets.len();
        let mut delivered = 0usize;
        for sender in targets {
            if sender.send(OutboundFrame::Payload(payload.clone())).is_ok() {
                delivered += 1;
            }
        }
        if total > 0 {
            tracing::debug!(room = %room, delivered, total, "broadcast");
        }
    }

    /// Push the room's snapshot to a single connection (used on bind).
    pub async fn update_one(&self, sender: &OutboundSender, room: &RoomName) {
        let Some(snapshot) = self.compose(room).await else {
            return;
        };
        match serde_json::to_string(&snapshot) {
            Ok(payload) => {
                let _ = sender.send(OutboundFrame::Payload(payload));
            }
            Err(e) => {
                tracing::error!(room = %room, error = %e, "snapshot serialization failed");
            }
        }
    }

    /// The current process-wide weather snapshot, if one has been fetched.
    pub fn current_weather(&self) -> Option<WeatherSnapshot> {
        self.weather
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }
}
