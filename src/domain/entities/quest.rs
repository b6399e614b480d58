//! Quest entities

use serde::{Deserialize, Serialize};

use super::level::Reward;
use super::story::StoryElement;

/// A generated quest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    pub objectives: Vec<QuestObjective>,
    pub prerequisites: Vec<String>,
    pub rewards: Vec<Reward>,
    pub story_elements: Vec<StoryElement>,
    pub difficulty: u32,
    /// Minutes: `15 * difficulty + 5 * objectives`
    pub estimated_duration: u32,
    /// Level this quest is assigned to, set when the quest is part of a narrative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_id: Option<String>,
}

impl Quest {
    pub fn estimate_duration(difficulty: u32, objective_count: usize) -> u32 {
        15 * difficulty + 5 * objective_count as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Main,
    #[default]
    Side,
    Daily,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestObjective {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ObjectiveKind,
    pub target: String,
    pub quantity: u32,
    pub completed: bool,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Collect,
    Kill,
    Explore,
    Interact,
    Escort,
}

impl ObjectiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collect => "collect",
            Self::Kill => "kill",
            Self::Explore => "explore",
            Self::Interact => "interact",
            Self::Escort => "escort",
        }
    }

    /// Player-facing objective text for a theme
    pub fn describe(&self, theme: &str) -> String {
        match self {
            Self::Collect => format!("Collect items related to {}", theme),
            Self::Kill => format!("Defeat enemies in the {} area", theme),
            Self::Explore => format!("Explore the {} region", theme),
            Self::Interact => format!("Interact with {} elements", theme),
            Self::Escort => format!("Escort an ally through the {} area", theme),
        }
    }
}
