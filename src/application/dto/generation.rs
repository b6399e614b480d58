//! Generation DTOs - Pipeline requests, blueprints and results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::GameEngine;
use crate::domain::services::{
    clamp_to, parse_engine, GameNarrative, GeneratedCode, LevelSizeRange, NarrativeConfig,
    TemplateError, COMPLEXITY_RANGE, LEVEL_COUNT_RANGE, QUEST_COUNT_RANGE,
};
use crate::domain::value_objects::JobId;

pub const DEFAULT_THEME: &str = "fantasy";

/// Free-text game description submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub game_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    /// `unity` or `godot`; the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

/// HTTP body for running a job to completion; mirrors `start_generation`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGenerationBody {
    #[serde(default)]
    pub session_id: Option<String>,
    pub data: GenerationRequest,
}

/// Coarse generation knobs derived from a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameBlueprint {
    pub theme: String,
    pub complexity: u32,
    pub num_levels: u32,
    pub num_quests: u32,
    pub engine: GameEngine,
}

impl GameBlueprint {
    /// Derive knobs from the game type table; the genre becomes the theme
    pub fn derive(request: &GenerationRequest, default_engine: GameEngine) -> Result<Self, TemplateError> {
        let engine = match request.engine.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => parse_engine(name)?,
            _ => default_engine,
        };
        let theme = request
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_THEME)
            .to_string();
        let (complexity, num_levels, num_quests) = game_type_profile(&request.game_type);

        Ok(Self {
            theme,
            complexity: clamp_to(complexity, COMPLEXITY_RANGE),
            num_levels: clamp_to(num_levels, LEVEL_COUNT_RANGE),
            num_quests: clamp_to(num_quests, QUEST_COUNT_RANGE),
            engine,
        })
    }

    pub fn narrative_config(&self, theme: &str) -> NarrativeConfig {
        NarrativeConfig {
            theme: theme.to_string(),
            complexity: self.complexity,
            num_levels: self.num_levels,
            num_quests: self.num_quests,
            level_params: LevelSizeRange::default(),
        }
        .clamped()
    }
}

/// (complexity, levels, quests) per game type
fn game_type_profile(game_type: &str) -> (u32, u32, u32) {
    match game_type.trim().to_lowercase().as_str() {
        "action" => (4, 4, 6),
        "adventure" => (5, 4, 8),
        "puzzle" => (3, 5, 4),
        "strategy" => (6, 4, 6),
        "rpg" => (7, 5, 12),
        "platformer" => (4, 6, 5),
        "racing" => (2, 4, 3),
        "simulation" => (5, 3, 6),
        _ => (5, 5, 10),
    }
}

/// Description of an asset the game needs; producing the asset itself is out of scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBrief {
    pub name: String,
    pub description: String,
}

/// Everything one generation job produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedGame {
    pub id: JobId,
    pub request: GenerationRequest,
    pub engine: GameEngine,
    pub theme: String,
    pub narrative: GameNarrative,
    pub gameplay_notes: String,
    pub files: Vec<GeneratedCode>,
    pub assets: Vec<AssetBrief>,
    pub completed_at: DateTime<Utc>,
}
