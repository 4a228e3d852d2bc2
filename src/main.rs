//! Marauder's Compendium
//!
//! Backend for the compendium's diary and storybook: an ephemeral
//! conversation with Tom Riddle's diary and a house-flavoured story
//! generator, both backed by a hosted Gemini model.

mod api;
mod diary;
mod house;
mod llm;
mod prompts;
mod story;

use api::{create_router, AppState};
use llm::{LlmConfig, ModelRegistry};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often abandoned diaries are swept
const REAPER_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marauders_compendium=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("COMPENDIUM_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let reply_timeout = std::env::var("COMPENDIUM_REPLY_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map_or(diary::DEFAULT_REPLY_TIMEOUT, Duration::from_secs);

    let idle_expiry = std::env::var("COMPENDIUM_SESSION_IDLE_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&secs: &u64| secs > 0)
        .map_or(diary::DEFAULT_IDLE_EXPIRY, Duration::from_secs);

    // Initialize the completion service
    let llm_config = LlmConfig::from_env();
    let registry = ModelRegistry::new(&llm_config)?;

    if registry.has_credential() {
        tracing::info!(model = %registry.model_id(), "Completion service configured");
    } else {
        tracing::warn!("No Gemini API key configured. Set GEMINI_API_KEY or LLM_GATEWAY.");
    }

    // Create application state
    let state = AppState::new(registry.service(), reply_timeout);
    state
        .diaries
        .spawn_reaper(idle_expiry, REAPER_PERIOD.min(idle_expiry));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(
        reply_timeout_secs = reply_timeout.as_secs(),
        idle_expiry_secs = idle_expiry.as_secs(),
        "Compendium listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
