//! Generation job API routes
//!
//! HTTP-started jobs run on their own task while the request waits for the
//! outcome. They retry failed stages automatically; progress is not streamed.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::application::dto::{
    CancelGenerationBody, CancelGenerationResponse, GeneratedGame, StartGenerationBody,
};
use crate::application::services::{GenerationOutcome, RetryMode};
use crate::domain::entities::Stage;
use crate::domain::value_objects::JobId;
use crate::infrastructure::state::AppState;

/// Ids of the jobs currently running
pub async fn list_generations(State(state): State<Arc<AppState>>) -> Json<Vec<JobId>> {
    Json(state.generation_service.controller().list_active())
}

/// Run a generation job and return the finished game
pub async fn start_generation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartGenerationBody>,
) -> Result<Json<GeneratedGame>, (StatusCode, String)> {
    let job_id = JobId::from_supplied(body.session_id.as_deref());
    tracing::info!(job_id = %job_id, "Running generation over HTTP");

    // Spawned; the job outlives a dropped request
    let handle = state
        .generation_service
        .start(job_id.clone(), body.data, RetryMode::Automatic)
        .map_err(|e| (StatusCode::CONFLICT, e.to_string()))?;
    let outcome = handle.await.map_err(|e| {
        tracing::error!(job_id = %job_id, "Generation task failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Generation {} aborted", job_id))
    })?;

    match outcome {
        GenerationOutcome::Completed(game) => Ok(Json(*game)),
        // Init only fails on bad input
        GenerationOutcome::Failed {
            stage: Stage::Init,
            message,
        } => Err((StatusCode::BAD_REQUEST, message)),
        GenerationOutcome::Failed { stage, message } => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} failed: {}", stage.display_name(), message),
        )),
        GenerationOutcome::Cancelled => Err((
            StatusCode::CONFLICT,
            format!("Generation {} was cancelled", job_id),
        )),
    }
}

/// Cancel a job; answers 200 whether or not it was running
pub async fn cancel_generation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CancelGenerationBody>,
) -> Json<CancelGenerationResponse> {
    let job_id = JobId::new(body.generation_id);
    let was_active = state.generation_service.cancel(&job_id);
    tracing::info!(job_id = %job_id, was_active, "Cancel requested over HTTP");
    Json(CancelGenerationResponse {
        generation_id: job_id.to_string(),
        was_active,
    })
}
