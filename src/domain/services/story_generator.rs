//! Story generator - Thematic story arcs from a catalog of reusable elements

use serde_json::json;

use crate::domain::entities::{
    ElementKind, PlotDifficulty, PlotKind, PlotPoint, StoryArc, StoryElement,
};
use crate::domain::value_objects::stamped_id;

/// Builds story arcs from a catalog of story elements.
///
/// Output depends only on the catalog, the theme and the complexity;
/// identifiers are the only part that changes between calls.
#[derive(Debug, Clone)]
pub struct StoryGenerator {
    elements: Vec<StoryElement>,
}

impl Default for StoryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryGenerator {
    pub fn new() -> Self {
        let mut generator = Self { elements: Vec::new() };
        for element in default_elements() {
            generator.add_story_element(element);
        }
        generator
    }

    /// Generator with an empty catalog
    pub fn empty() -> Self {
        Self { elements: Vec::new() }
    }

    #[tracing::instrument(skip(self))]
    pub fn generate_story_arc(&self, theme: &str, complexity: u32) -> StoryArc {
        let elements = self.relevant_elements(theme);
        let plot_points = generate_plot_points(complexity);

        tracing::debug!(
            elements = elements.len(),
            plot_points = plot_points.len(),
            "Generated story arc"
        );

        StoryArc {
            id: stamped_id("story"),
            title: format!("The Epic of {}", theme),
            description: format!(
                "An epic tale set in the world of {}, featuring {} key elements.",
                theme,
                elements.len()
            ),
            elements,
            plot_points,
            main_objective: format!("Become the greatest {} master in the realm", theme),
        }
    }

    /// Catalog elements whose keywords overlap the theme, in catalog order
    pub fn relevant_elements(&self, theme: &str) -> Vec<StoryElement> {
        self.elements
            .iter()
            .filter(|element| element.is_relevant_to(theme))
            .cloned()
            .collect()
    }

    /// Add an element, replacing any existing element with the same id
    pub fn add_story_element(&mut self, element: StoryElement) {
        match self.elements.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
    }

    pub fn get_story_element(&self, id: &str) -> Option<&StoryElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn all_story_elements(&self) -> &[StoryElement] {
        &self.elements
    }
}

fn generate_plot_points(complexity: u32) -> Vec<PlotPoint> {
    let total = (complexity * 2).max(3) as usize;
    let main_cutoff = (total as f64 * 0.3).floor() as usize;

    let mut points: Vec<PlotPoint> = Vec::with_capacity(total);
    for index in 0..total {
        let prerequisites = points
            .last()
            .map(|previous| vec![previous.id.clone()])
            .unwrap_or_default();

        points.push(PlotPoint {
            id: stamped_id(&format!("plot_{}", index)),
            title: format!("Plot Point {}", index + 1),
            description: format!("Description for plot point {}", index + 1),
            prerequisites,
            kind: if index <= main_cutoff {
                PlotKind::Main
            } else {
                PlotKind::Side
            },
            difficulty: PlotDifficulty::from_progress(index as f64 / total as f64),
        });
    }
    points
}

fn default_elements() -> Vec<StoryElement> {
    vec![
        StoryElement::new(
            "hero_archetype",
            ElementKind::Character,
            "Hero Archetype",
            "A brave protagonist ready for adventure",
        )
        .with_attribute("role", json!("protagonist"))
        .with_attribute("archetype", json!("hero"))
        .with_attribute("motivations", json!(["justice", "adventure"])),
        StoryElement::new(
            "mentor_archetype",
            ElementKind::Character,
            "Mentor Archetype",
            "A wise guide for the hero",
        )
        .with_attribute("role", json!("support"))
        .with_attribute("archetype", json!("mentor"))
        .with_attribute("motivations", json!(["guidance", "wisdom"])),
        StoryElement::new(
            "shadow_archetype",
            ElementKind::Character,
            "Shadow Archetype",
            "A rival whose ambition threatens the world",
        )
        .with_attribute("role", json!("antagonist"))
        .with_attribute("archetype", json!("villain"))
        .with_attribute("motivations", json!(["power", "revenge"])),
        StoryElement::new(
            "forgotten_ruins",
            ElementKind::Location,
            "Forgotten Ruins",
            "Crumbling halls of a lost civilization, guarded by old magic",
        )
        .with_attribute("biome", json!("ruins")),
        StoryElement::new(
            "ancient_relic",
            ElementKind::Item,
            "Ancient Relic",
            "A mysterious artifact of great power",
        )
        .with_attribute("rarity", json!("legendary")),
        StoryElement::new(
            "uprising",
            ElementKind::Event,
            "The Uprising",
            "A rebellion that turns the kingdom against its rulers",
        )
        .with_attribute("scale", json!("kingdom")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_point_count_and_chain() {
        let generator = StoryGenerator::new();
        let arc = generator.generate_story_arc("fantasy", 5);

        assert_eq!(arc.plot_points.len(), 10);
        assert!(arc.plot_points[0].prerequisites.is_empty());
        for pair in arc.plot_points.windows(2) {
            assert_eq!(pair[1].prerequisites, vec![pair[0].id.clone()]);
        }
    }

    #[test]
    fn test_minimum_three_plot_points() {
        let arc = StoryGenerator::new().generate_story_arc("fantasy", 1);
        assert_eq!(arc.plot_points.len(), 3);
    }

    #[test]
    fn test_main_side_split_and_difficulty() {
        let arc = StoryGenerator::new().generate_story_arc("fantasy", 5);
        // floor(10 * 0.3) = 3, so indices 0..=3 are main
        let kinds: Vec<PlotKind> = arc.plot_points.iter().map(|p| p.kind).collect();
        assert_eq!(&kinds[..4], &[PlotKind::Main; 4]);
        assert!(kinds[4..].iter().all(|k| *k == PlotKind::Side));

        assert_eq!(arc.plot_points[2].difficulty, PlotDifficulty::Easy);
        assert_eq!(arc.plot_points[3].difficulty, PlotDifficulty::Medium);
        assert_eq!(arc.plot_points[7].difficulty, PlotDifficulty::Hard);
    }

    #[test]
    fn test_element_selection_by_theme() {
        let generator = StoryGenerator::new();
        let arc = generator.generate_story_arc("ancient ruins", 3);
        let ids: Vec<&str> = arc.elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["forgotten_ruins", "ancient_relic"]);
        assert!(arc.description.contains("featuring 2 key elements"));
    }

    #[test]
    fn test_structure_is_stable_apart_from_ids() {
        let generator = StoryGenerator::new();
        let mut a = generator.generate_story_arc("hero", 4);
        let mut b = generator.generate_story_arc("hero", 4);
        assert_ne!(a.id, b.id);

        for arc in [&mut a, &mut b] {
            arc.id.clear();
            for point in &mut arc.plot_points {
                point.id.clear();
                point.prerequisites.clear();
            }
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_catalog_upsert() {
        let mut generator = StoryGenerator::empty();
        generator.add_story_element(StoryElement::new("a", ElementKind::Item, "Lamp", "old"));
        generator.add_story_element(StoryElement::new("a", ElementKind::Item, "Lantern", "new"));

        assert_eq!(generator.all_story_elements().len(), 1);
        assert_eq!(generator.get_story_element("a").map(|e| e.name.as_str()), Some("Lantern"));
        assert!(generator.get_story_element("b").is_none());
    }
}
