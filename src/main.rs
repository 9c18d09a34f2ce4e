//! Roomcast service binary.
//!
//! Boots configuration and tracing, repairs and indexes the room store,
//! spawns the periodic triggers, and serves the HTTP/WebSocket surface.

use std::sync::{Arc, RwLock};

use chrono::Local;
use tracing_subscriber::EnvFilter;

use roomcast::adapters::http::{app_router, AppState};
use roomcast::adapters::identity::HttpIdentityVerifier;
use roomcast::adapters::storage::FsRoomStore;
use roomcast::adapters::weather::NwsWeatherProvider;
use roomcast::application::{
    AdminService, BroadcastCoordinator, RoomRegistry, ScheduleResolver, SchedulerTriggers,
    SharedWeather,
};
use roomcast::config::AppConfig;
use roomcast::ports::{IdentityVerifier, RoomStore, WeatherProvider};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("configuration invalid: {e}");
        std::process::exit(1);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn RoomStore> = Arc::new(FsRoomStore::new(&config.storage.data_dir));
    let registry = Arc::new(RoomRegistry::new());
    let weather: SharedWeather = Arc::new(RwLock::new(None));
    let resolver = Arc::new(ScheduleResolver::new(Arc::clone(&store)));
    let broadcast = Arc::new(BroadcastCoordinator::new(
        Arc::clone(&registry),
        Arc::clone(&store),
        Arc::clone(&weather),
    ));

    // Startup scan: repair any room directory missing documents, then
    // resolve today's schedule for each room into the registry cache.
    let today = Local::now().date_naive();
    for room in store.list_rooms().await? {
        store.create_room(&room).await?;
        let periods = resolver.resolve(&room, today).await;
        registry.insert_room(room.clone());
        registry.set_resolved(room.as_str(), periods);
    }
    tracing::info!(rooms = registry.rooms().len(), "room registry initialized");

    let identity: Arc<dyn IdentityVerifier> = Arc::new(HttpIdentityVerifier::new(&config.auth)?);
    let admin = Arc::new(AdminService::new(
        Arc::clone(&store),
        Arc::clone(&registry),
        Arc::clone(&resolver),
        Arc::clone(&broadcast),
        identity,
    ));

    let provider: Arc<dyn WeatherProvider> = Arc::new(NwsWeatherProvider::new(&config.weather)?);
    let triggers = Arc::new(SchedulerTriggers::new(
        Arc::clone(&registry),
        resolver,
        Arc::clone(&broadcast),
        provider,
        weather,
        config.weather.refresh_period(),
    ));
    triggers.spawn();

    let state = AppState {
        store,
        registry,
        broadcast,
        admin,
        heartbeat_period: config.sync.heartbeat_period(),
    };

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "roomcast listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
