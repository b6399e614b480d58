//! Narrative API routes - Direct story, level and quest generation
//!
//! Every numeric input is clamped into range rather than rejected, so these
//! handlers cannot fail.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::dto::{LevelRequest, NarrativeRequest, QuestRequest, StoryRequest};
use crate::domain::entities::{LevelDesign, Quest, StoryArc};
use crate::domain::services::GameNarrative;
use crate::domain::value_objects::random::system_rng;
use crate::infrastructure::state::AppState;

/// Generate a full narrative: story arc, levels and quests
pub async fn generate_narrative(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NarrativeRequest>,
) -> Json<GameNarrative> {
    let config = req.into_config();
    let mut rng = system_rng(state.config.generation_seed);
    tracing::debug!(theme = %config.theme, levels = config.num_levels, "Generating narrative");
    Json(state.narrative.generate_game_narrative(&config, &mut rng))
}

pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StoryRequest>,
) -> Json<StoryArc> {
    let (theme, complexity) = req.into_params();
    Json(state.narrative.story_generator().generate_story_arc(&theme, complexity))
}

pub async fn generate_level(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LevelRequest>,
) -> Json<LevelDesign> {
    let params = req.into_params();
    let mut rng = system_rng(state.config.generation_seed);
    Json(state.narrative.level_generator().generate_level(&params, &mut rng))
}

pub async fn generate_quest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestRequest>,
) -> Json<Quest> {
    let params = req.into_params();
    let mut rng = system_rng(state.config.generation_seed);
    Json(state.narrative.quest_generator().generate_quest(&params, &mut rng))
}
