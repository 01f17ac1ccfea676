// File: services/roomify_backend/src/main.rs
use roomify_config::load_config;
use std::sync::Arc;
use tracing::{error, info};

mod app_state;
use app_state::AppState;

#[tokio::main]
async fn main() {
    roomify_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = AppState::build(config)
        .await
        .expect("Failed to initialize application state");

    info!("Roomify booking core ready");
    let sweeper = state.scheduler.clone().start();

    // The HTTP boundary is a separate concern; this process hosts the
    // periodic consistency sweep and waits for shutdown.
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutting down");
    sweeper.abort();
}
