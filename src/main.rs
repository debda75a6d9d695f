// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::settings_store::SettingsStore;
use crate::application::speedometer_service::SpeedometerService;
use crate::application::streaming_service::StreamingSpeedometerService;
use crate::infrastructure::config::load_config;
use crate::infrastructure::memory_settings::MemorySettingsStore;
use crate::infrastructure::settings_file::TomlSettingsStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_speedometer, health_check, ingest_sample, list_units, next_unit, select_unit,
    set_speed_limit, stream_speedometer, toggle_speed_limit,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;

    // Settings store (infrastructure layer)
    let store: Arc<dyn SettingsStore> = match &config.settings.path {
        Some(path) => {
            let store = TomlSettingsStore::open(path).await?;
            tracing::info!("Persisting settings to {}", store.path().display());
            Arc::new(store)
        }
        None => {
            tracing::warn!("No settings path configured, preferences will not survive a restart");
            Arc::new(MemorySettingsStore::new())
        }
    };

    // Services (application layer)
    let speedometer_service =
        SpeedometerService::load(store, config.speed_model(), config.speedometer_options()).await?;
    let streaming_service = StreamingSpeedometerService::new(speedometer_service.clone());

    let state = Arc::new(AppState {
        speedometer_service,
        streaming_service,
        coordinate_format: config.display.coordinate_format,
    });

    // Router (presentation layer). Responses are compressed by hand,
    // so no CompressionLayer here.
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/units", get(list_units))
        .route("/speedometer", get(get_speedometer))
        .route("/speedometer/stream", get(stream_speedometer))
        .route("/samples", post(ingest_sample))
        .route("/unit/next", post(next_unit))
        .route("/unit/:unit", put(select_unit))
        .route("/speed-limit", put(set_speed_limit))
        .route("/speed-limit/toggle", post(toggle_speed_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.server.bind))?;
    tracing::info!("Starting speedometer service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
