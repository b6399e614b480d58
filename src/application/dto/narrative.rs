//! Narrative DTOs - Request bodies for direct story/level/quest generation
//!
//! Every numeric field is optional, floored and clamped into its allowed
//! range. Out-of-range values are never rejected.

use serde::Deserialize;

use super::generation::DEFAULT_THEME;
use crate::domain::entities::QuestKind;
use crate::domain::services::{
    LevelParams, LevelSizeRange, NarrativeConfig, QuestParams, COMPLEXITY_RANGE,
    LEVEL_COUNT_RANGE, LEVEL_SIZE_RANGE, QUEST_COUNT_RANGE,
};

/// Floor and clamp an optional client number, falling back to a default
pub fn clamp_number(value: Option<f64>, default: u32, range: (u32, u32)) -> u32 {
    let value = match value {
        Some(v) if v.is_finite() => v.floor(),
        _ => f64::from(default),
    };
    value.clamp(f64::from(range.0), f64::from(range.1)) as u32
}

fn theme_or_default(theme: Option<String>) -> String {
    theme
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_THEME.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRangeInput {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub theme: Option<String>,
    pub complexity: Option<f64>,
    pub num_levels: Option<f64>,
    pub num_quests: Option<f64>,
    #[serde(default)]
    pub level_params: LevelRangeInput,
}

impl NarrativeRequest {
    pub fn into_config(self) -> NarrativeConfig {
        let defaults = LevelSizeRange::default();
        let range = self.level_params;
        NarrativeConfig {
            theme: theme_or_default(self.theme),
            complexity: clamp_number(self.complexity, 5, COMPLEXITY_RANGE),
            num_levels: clamp_number(self.num_levels, 5, LEVEL_COUNT_RANGE),
            num_quests: clamp_number(self.num_quests, 10, QUEST_COUNT_RANGE),
            level_params: LevelSizeRange {
                min_width: clamp_number(range.min_width, defaults.min_width, LEVEL_SIZE_RANGE),
                max_width: clamp_number(range.max_width, defaults.max_width, LEVEL_SIZE_RANGE),
                min_height: clamp_number(range.min_height, defaults.min_height, LEVEL_SIZE_RANGE),
                max_height: clamp_number(range.max_height, defaults.max_height, LEVEL_SIZE_RANGE),
            },
        }
        .clamped()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryRequest {
    pub theme: Option<String>,
    pub complexity: Option<f64>,
}

impl StoryRequest {
    /// `(theme, complexity)`
    pub fn into_params(self) -> (String, u32) {
        (
            theme_or_default(self.theme),
            clamp_number(self.complexity, 5, COMPLEXITY_RANGE),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelRequest {
    pub theme: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub difficulty: Option<f64>,
}

impl LevelRequest {
    pub fn into_params(self) -> LevelParams {
        LevelParams {
            width: clamp_number(self.width, 20, LEVEL_SIZE_RANGE),
            height: clamp_number(self.height, 20, LEVEL_SIZE_RANGE),
            difficulty: clamp_number(self.difficulty, 5, COMPLEXITY_RANGE),
            theme: theme_or_default(self.theme),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestRequest {
    pub theme: Option<String>,
    pub difficulty: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<QuestKind>,
}

impl QuestRequest {
    pub fn into_params(self) -> QuestParams {
        QuestParams::new(
            theme_or_default(self.theme),
            clamp_number(self.difficulty, 5, COMPLEXITY_RANGE),
            self.kind.unwrap_or_default(),
        )
    }
}
