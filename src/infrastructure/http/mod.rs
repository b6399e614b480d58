//! HTTP REST API routes

mod code_routes;
mod generation_routes;
mod narrative_routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Narrative routes
        .route("/api/narrative/generate", post(narrative_routes::generate_narrative))
        .route("/api/narrative/story", post(narrative_routes::generate_story))
        .route("/api/narrative/level", post(narrative_routes::generate_level))
        .route("/api/narrative/quest", post(narrative_routes::generate_quest))
        // Code synthesis routes
        .route("/api/code-synthesis/generate", post(code_routes::generate_code))
        .route(
            "/api/code-synthesis/templates/{engine}",
            get(code_routes::list_templates).post(code_routes::add_template),
        )
        .route(
            "/api/code-synthesis/templates/{engine}/{id}",
            get(code_routes::get_template),
        )
        .route("/api/code-synthesis/validate", post(code_routes::validate_code))
        .route(
            "/api/code-synthesis/rules/{engine}",
            get(code_routes::list_rules).post(code_routes::add_rule),
        )
        // Generation job routes
        .route(
            "/api/generations",
            get(generation_routes::list_generations).post(generation_routes::start_generation),
        )
        .route("/api/generation/cancel", post(generation_routes::cancel_generation))
}
