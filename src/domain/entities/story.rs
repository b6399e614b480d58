//! Story entities - Reusable story elements, plot points and story arcs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A reusable building block of a story (character, place, item or event)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl StoryElement {
    pub fn new(
        id: impl Into<String>,
        kind: ElementKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Lowercased searchable text: name, description and string-valued attributes
    pub fn keywords(&self) -> Vec<String> {
        let mut words = vec![self.name.to_lowercase(), self.description.to_lowercase()];
        words.extend(
            self.attributes
                .values()
                .filter_map(|v| v.as_str())
                .map(str::to_lowercase),
        );
        words.retain(|w| !w.is_empty());
        words
    }

    /// Whether any theme keyword overlaps any element keyword, in either direction
    pub fn is_relevant_to(&self, theme: &str) -> bool {
        let element_words = self.keywords();
        theme
            .to_lowercase()
            .split_whitespace()
            .any(|keyword| {
                element_words
                    .iter()
                    .any(|word| word.contains(keyword) || keyword.contains(word.as_str()))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Character,
    Location,
    Item,
    Event,
}

/// One beat of the story arc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotPoint {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Ids of the plot points that must happen first. Generation currently
    /// links each point to its immediate predecessor only.
    pub prerequisites: Vec<String>,
    #[serde(rename = "type")]
    pub kind: PlotKind,
    pub difficulty: PlotDifficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Main,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotDifficulty {
    Easy,
    Medium,
    Hard,
}

impl PlotDifficulty {
    /// Tier for a normalized position in the arc (`index / total`)
    pub fn from_progress(progress: f64) -> Self {
        if progress < 0.3 {
            Self::Easy
        } else if progress < 0.7 {
            Self::Medium
        } else {
            Self::Hard
        }
    }
}

/// A complete story arc produced for one narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryArc {
    pub id: String,
    pub title: String,
    pub description: String,
    pub elements: Vec<StoryElement>,
    pub plot_points: Vec<PlotPoint>,
    pub main_objective: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hero() -> StoryElement {
        StoryElement::new(
            "hero",
            ElementKind::Character,
            "Hero Archetype",
            "A brave protagonist ready for adventure",
        )
        .with_attribute("archetype", json!("hero"))
        .with_attribute("motivations", json!(["justice", "adventure"]))
    }

    #[test]
    fn test_relevance_is_case_insensitive() {
        assert!(hero().is_relevant_to("BRAVE new world"));
        assert!(!hero().is_relevant_to("cyberpunk"));
    }

    #[test]
    fn test_relevance_matches_in_either_direction() {
        // "superheroes" contains the attribute value "hero"
        assert!(hero().is_relevant_to("superheroes"));
    }

    #[test]
    fn test_non_string_attributes_are_ignored() {
        // "justice" only appears inside an array attribute
        assert!(!hero().is_relevant_to("justice"));
    }

    #[test]
    fn test_blank_theme_matches_nothing() {
        assert!(!hero().is_relevant_to("   "));
    }

    #[test]
    fn test_plot_difficulty_tiers() {
        assert_eq!(PlotDifficulty::from_progress(0.0), PlotDifficulty::Easy);
        assert_eq!(PlotDifficulty::from_progress(0.29), PlotDifficulty::Easy);
        assert_eq!(PlotDifficulty::from_progress(0.3), PlotDifficulty::Medium);
        assert_eq!(PlotDifficulty::from_progress(0.69), PlotDifficulty::Medium);
        assert_eq!(PlotDifficulty::from_progress(0.7), PlotDifficulty::Hard);
    }
}
