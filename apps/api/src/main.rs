mod ai_client;
mod composer;
mod config;
mod diary_ai;
mod errors;
mod models;
mod overlay;
mod raster;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::AiClient;
use crate::config::Config;
use crate::diary_ai::LlmDiaryAi;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Diary API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize AI client
    let ai = AiClient::new(
        config.ai_api_key.clone(),
        config.ai_api_url.clone(),
        config.ai_model.clone(),
    )?;
    info!("AI client initialized (model: {})", ai.model());

    info!(
        px_per_unit = config.placement.px_per_unit,
        min_size = config.placement.min_size_units,
        default_size = config.placement.default_size_units,
        "Overlay placement config"
    );

    let state = AppState::new(config.clone(), Arc::new(LlmDiaryAi(ai)));
    state.boards.spawn_idle_sweeper();
    info!(
        idle_ttl_secs = config.board_idle_ttl.as_secs(),
        "Overlay board sweeper started"
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
