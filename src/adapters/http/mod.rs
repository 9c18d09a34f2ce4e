//! HTTP adapters - the read surface, the admin mutation surface, and the
//! realtime WebSocket route, all on one axum router.

pub mod admin;
pub mod dto;
pub mod read;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::{AdminService, BroadcastCoordinator, RoomRegistry};
use crate::ports::RoomStore;

/// Shared state for every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RoomStore>,
    pub registry: Arc<RoomRegistry>,
    pub broadcast: Arc<BroadcastCoordinator>,
    pub admin: Arc<AdminService>,
    /// Period between heartbeat probes on each connection.
    pub heartbeat_period: Duration,
}

/// Build the application router.
///
/// Route names and shapes are shared with the admin site and the display
/// clients; they are part of the external contract.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/schedules",
            get(read::get_schedules).post(admin::post_schedules),
        )
        .route(
            "/defaultWeek",
            get(read::get_default_week).post(admin::post_default_week),
        )
        .route(
            "/calendar",
            get(read::get_calendar).post(admin::post_calendar),
        )
        .route("/layout", get(read::get_layout).post(admin::post_layout))
        .route("/rooms", get(read::get_rooms).post(admin::post_rooms))
        .route("/sync", get(ws::sync_ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::identity::MockIdentityVerifier;
    use crate::adapters::storage::MemoryRoomStore;
    use crate::application::{BroadcastCoordinator, ScheduleResolver, SharedWeather};
    use std::sync::RwLock;

    #[test]
    fn router_builds() {
        let store: Arc<dyn RoomStore> = Arc::new(MemoryRoomStore::new());
        let registry = Arc::new(RoomRegistry::new());
        let weather: SharedWeather = Arc::new(RwLock::new(None));
        let resolver = Arc::new(ScheduleResolver::new(Arc::clone(&store)));
        let broadcast = Arc::new(BroadcastCoordinator::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            weather,
        ));
        let admin = Arc::new(AdminService::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            resolver,
            Arc::clone(&broadcast),
            Arc::new(MockIdentityVerifier::new()),
        ));
        let state = AppState {
            store,
            registry,
            broadcast,
            admin,
            heartbeat_period: Duration::from_secs(30),
        };
        let _router = app_router(state);
    }
}
