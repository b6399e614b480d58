//! GameForge Engine - Backend API for AI-assisted game generation
//!
//! The Engine is the backend server that:
//! - Generates story arcs, levels and quests
//! - Renders and validates Unity and Godot scripts from templates
//! - Runs staged generation jobs with cancellation and retry
//! - Streams job progress to clients via WebSocket
//! - Integrates with Ollama for themes, gameplay notes and asset briefs

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::GenerationEventPublisher;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::session_adapter::SessionRegistryAdapter;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gameforge_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting GameForge Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Content backend: {:?}", config.content_backend);
    tracing::info!("  Ollama: {} ({})", config.ollama_base_url, config.ollama_model);
    tracing::info!("  Default engine: {}", config.default_engine);
    let port = config.server_port;

    // Initialize application state
    let (state, generation_events) = AppState::new(config)?;
    let state = Arc::new(state);
    tracing::info!("Application state initialized");

    // Forward generation events to the owning WebSocket clients
    let publisher_task = {
        let notifier = Arc::new(SessionRegistryAdapter::new(state.sessions.clone()));
        tokio::spawn(async move {
            tracing::info!("Starting generation event publisher");
            GenerationEventPublisher::new(notifier)
                .run(generation_events)
                .await;
        })
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(infrastructure::websocket::ws_handler))
        // Merge REST API routes
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping publisher...");
            publisher_task.abort();
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
