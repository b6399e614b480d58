//! Narrative generator - Composes story, level and quest generation
//!
//! One call produces a complete `{story, levels, quests}` bundle: level
//! difficulty rises with level index, 30% of quests (rounded up) are main
//! quests, and quests are spread across levels round-robin.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::level_generator::{LevelGenerator, LevelParams};
use super::quest_generator::{QuestGenerator, QuestParams};
use super::story_generator::StoryGenerator;
use crate::domain::entities::{LevelDesign, Quest, QuestKind, StoryArc, StoryElement};
use crate::domain::value_objects::random::{between, int_in_range};

pub const COMPLEXITY_RANGE: (u32, u32) = (1, 10);
pub const LEVEL_COUNT_RANGE: (u32, u32) = (1, 20);
pub const QUEST_COUNT_RANGE: (u32, u32) = (1, 50);
pub const LEVEL_SIZE_RANGE: (u32, u32) = (5, 100);

/// Clamp a value into an inclusive `(min, max)` range
pub fn clamp_to(value: u32, range: (u32, u32)) -> u32 {
    value.clamp(range.0, range.1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSizeRange {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl Default for LevelSizeRange {
    fn default() -> Self {
        Self {
            min_width: 10,
            max_width: 20,
            min_height: 10,
            max_height: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeConfig {
    pub theme: String,
    pub complexity: u32,
    pub num_levels: u32,
    pub num_quests: u32,
    pub level_params: LevelSizeRange,
}

impl NarrativeConfig {
    /// Clamp every knob into its allowed range and order each min/max pair
    pub fn clamped(self) -> Self {
        let (min_width, max_width) = ordered(
            clamp_to(self.level_params.min_width, LEVEL_SIZE_RANGE),
            clamp_to(self.level_params.max_width, LEVEL_SIZE_RANGE),
        );
        let (min_height, max_height) = ordered(
            clamp_to(self.level_params.min_height, LEVEL_SIZE_RANGE),
            clamp_to(self.level_params.max_height, LEVEL_SIZE_RANGE),
        );

        Self {
            theme: self.theme,
            complexity: clamp_to(self.complexity, COMPLEXITY_RANGE),
            num_levels: clamp_to(self.num_levels, LEVEL_COUNT_RANGE),
            num_quests: clamp_to(self.num_quests, QUEST_COUNT_RANGE),
            level_params: LevelSizeRange {
                min_width,
                max_width,
                min_height,
                max_height,
            },
        }
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameNarrative {
    pub story: StoryArc,
    pub levels: Vec<LevelDesign>,
    pub quests: Vec<Quest>,
}

impl GameNarrative {
    pub fn main_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(|q| q.kind == QuestKind::Main)
    }

    pub fn side_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(|q| q.kind == QuestKind::Side)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeGenerator {
    story: StoryGenerator,
    levels: LevelGenerator,
    quests: QuestGenerator,
}

impl NarrativeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(self, config, rng), fields(theme = %config.theme))]
    pub fn generate_game_narrative<R: Rng + ?Sized>(
        &self,
        config: &NarrativeConfig,
        rng: &mut R,
    ) -> GameNarrative {
        let story = self.story.generate_story_arc(&config.theme, config.complexity);
        let levels = self.generate_levels(config, rng);
        let mut quests = self.generate_quests(config, &story.elements, rng);

        if !levels.is_empty() {
            for (index, quest) in quests.iter_mut().enumerate() {
                quest.level_id = Some(levels[index % levels.len()].id.clone());
            }
        }

        tracing::debug!(
            levels = levels.len(),
            quests = quests.len(),
            "Generated game narrative"
        );

        GameNarrative {
            story,
            levels,
            quests,
        }
    }

    fn generate_levels<R: Rng + ?Sized>(&self, config: &NarrativeConfig, rng: &mut R) -> Vec<LevelDesign> {
        let range = &config.level_params;
        (0..config.num_levels)
            .map(|index| {
                let width = int_in_range(rng, range.min_width, range.max_width);
                let height = int_in_range(rng, range.min_height, range.max_height);
                let params = LevelParams {
                    width,
                    height,
                    difficulty: level_difficulty(index, config.num_levels, config.complexity),
                    theme: format!("{}_level_{}", config.theme, index + 1),
                };
                self.levels.generate_level(&params, rng)
            })
            .collect()
    }

    fn generate_quests<R: Rng + ?Sized>(
        &self,
        config: &NarrativeConfig,
        elements: &[StoryElement],
        rng: &mut R,
    ) -> Vec<Quest> {
        let main_count = (f64::from(config.num_quests) * 0.3).ceil() as u32;
        let side_count = config.num_quests.saturating_sub(main_count);
        let complexity = f64::from(config.complexity);

        let mut quests = Vec::with_capacity(config.num_quests as usize);
        let groups = [
            (QuestKind::Main, main_count, complexity, "main"),
            (QuestKind::Side, side_count, complexity * 0.7, "side"),
        ];
        for (kind, count, base, suffix) in groups {
            for index in 0..count {
                let difficulty = quest_difficulty(index, count, base, rng);
                let linked = elements[..elements.len().min(2 + index as usize)].to_vec();
                let params = QuestParams::new(format!("{}_{}", config.theme, suffix), difficulty, kind)
                    .with_elements(linked);
                quests.push(self.quests.generate_quest(&params, rng));
            }
        }
        quests
    }

    pub fn story_generator(&self) -> &StoryGenerator {
        &self.story
    }

    pub fn story_generator_mut(&mut self) -> &mut StoryGenerator {
        &mut self.story
    }

    pub fn level_generator(&self) -> &LevelGenerator {
        &self.levels
    }

    pub fn level_generator_mut(&mut self) -> &mut LevelGenerator {
        &mut self.levels
    }

    pub fn quest_generator(&self) -> &QuestGenerator {
        &self.quests
    }

    pub fn quest_generator_mut(&mut self) -> &mut QuestGenerator {
        &mut self.quests
    }
}

/// `max(1, floor(C * (0.5 + progress * 0.8)))` with `progress = (index + 1) / total`
pub fn level_difficulty(index: u32, total: u32, complexity: u32) -> u32 {
    let progress = f64::from(index + 1) / f64::from(total.max(1));
    let difficulty = (f64::from(complexity) * (0.5 + progress * 0.8)).floor() as u32;
    difficulty.max(1)
}

fn quest_difficulty<R: Rng + ?Sized>(index: u32, total: u32, base: f64, rng: &mut R) -> u32 {
    let progress = f64::from(index + 1) / f64::from(total.max(1));
    let jitter = between(rng, 0.8, 1.2);
    ((base * progress * jitter).floor() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(complexity: u32, num_levels: u32, num_quests: u32) -> NarrativeConfig {
        NarrativeConfig {
            theme: "fantasy".to_string(),
            complexity,
            num_levels,
            num_quests,
            level_params: LevelSizeRange::default(),
        }
    }

    #[test]
    fn test_level_difficulty_is_monotonic() {
        let generator = NarrativeGenerator::new();
        for complexity in 1..=10 {
            let mut rng = StdRng::seed_from_u64(u64::from(complexity));
            let narrative = generator.generate_game_narrative(&config(complexity, 8, 3), &mut rng);
            for pair in narrative.levels.windows(2) {
                assert!(pair[0].difficulty <= pair[1].difficulty);
            }
        }
    }

    #[test]
    fn test_quest_split() {
        let generator = NarrativeGenerator::new();
        let mut rng = StdRng::seed_from_u64(12);
        for num_quests in [1, 7, 10, 33] {
            let narrative = generator.generate_game_narrative(&config(5, 3, num_quests), &mut rng);
            let main = narrative.main_quests().count() as u32;
            let side = narrative.side_quests().count() as u32;
            assert_eq!(main, (f64::from(num_quests) * 0.3).ceil() as u32);
            assert_eq!(main + side, num_quests);
        }
    }

    #[test]
    fn test_round_robin_level_assignment() {
        let generator = NarrativeGenerator::new();
        let mut rng = StdRng::seed_from_u64(3);
        let narrative = generator.generate_game_narrative(&config(4, 3, 7), &mut rng);

        for (index, quest) in narrative.quests.iter().enumerate() {
            let expected = &narrative.levels[index % 3].id;
            assert_eq!(quest.level_id.as_ref(), Some(expected));
        }
    }

    #[test]
    fn test_level_sizes_within_range() {
        let generator = NarrativeGenerator::new();
        let mut rng = StdRng::seed_from_u64(21);
        let mut cfg = config(3, 6, 2);
        cfg.level_params = LevelSizeRange {
            min_width: 5,
            max_width: 8,
            min_height: 6,
            max_height: 6,
        };
        let narrative = generator.generate_game_narrative(&cfg, &mut rng);

        for (index, level) in narrative.levels.iter().enumerate() {
            let dims = level.layout.dimensions;
            assert!((5..=8).contains(&dims.width));
            assert_eq!(dims.height, 6);
            assert_eq!(level.layout.terrain.len(), (dims.width * dims.height) as usize);
            assert_eq!(level.name, format!("fantasy_level_{} Level", index + 1));
        }
    }

    #[test]
    fn test_quests_link_growing_element_prefix() {
        let generator = NarrativeGenerator::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut cfg = config(5, 2, 10);
        // Every default element mentions an "a" somewhere
        cfg.theme = "a".to_string();
        let narrative = generator.generate_game_narrative(&cfg, &mut rng);
        let available = narrative.story.elements.len();
        assert!(available >= 3);

        let main: Vec<&Quest> = narrative.main_quests().collect();
        assert_eq!(main[0].story_elements.len(), 2.min(available));
        assert_eq!(main[1].story_elements.len(), 3.min(available));
        let side: Vec<&Quest> = narrative.side_quests().collect();
        assert_eq!(side[0].story_elements.len(), 2.min(available));
    }

    #[test]
    fn test_quest_difficulty_floor_is_one() {
        let generator = NarrativeGenerator::new();
        let mut rng = StdRng::seed_from_u64(6);
        let narrative = generator.generate_game_narrative(&config(1, 1, 20), &mut rng);
        assert!(narrative.quests.iter().all(|q| q.difficulty >= 1));
        assert!(narrative.levels.iter().all(|l| l.difficulty >= 1));
    }

    #[test]
    fn test_level_difficulty_formula() {
        assert_eq!(level_difficulty(0, 5, 5), 3);
        assert_eq!(level_difficulty(4, 5, 5), 6);
        assert_eq!(level_difficulty(0, 10, 1), 1);
    }

    #[test]
    fn test_config_clamping() {
        let cfg = NarrativeConfig {
            theme: "t".to_string(),
            complexity: 0,
            num_levels: 99,
            num_quests: 0,
            level_params: LevelSizeRange {
                min_width: 500,
                max_width: 2,
                min_height: 30,
                max_height: 12,
            },
        }
        .clamped();

        assert_eq!(cfg.complexity, 1);
        assert_eq!(cfg.num_levels, 20);
        assert_eq!(cfg.num_quests, 1);
        assert_eq!((cfg.level_params.min_width, cfg.level_params.max_width), (5, 100));
        assert_eq!((cfg.level_params.min_height, cfg.level_params.max_height), (12, 30));
    }
}
