//! Level entities - Layouts, points of interest, challenges and rewards

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A generated level: spatial layout plus what the player does there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDesign {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: u32,
    pub layout: LevelLayout,
    pub objectives: Vec<String>,
    pub challenges: Vec<Challenge>,
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelLayout {
    pub dimensions: Dimensions,
    /// Dense grid: one tile per (x, y) cell, x-major
    pub terrain: Vec<TerrainTile>,
    pub points_of_interest: Vec<PointOfInterest>,
}

impl LevelLayout {
    /// Terrain tile at a cell, if inside the grid
    pub fn tile_at(&self, x: u32, y: u32) -> Option<&TerrainTile> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let index = (x as usize) * (self.dimensions.height as usize) + y as usize;
        self.terrain.get(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Position {
    pub fn flat(x: u32, y: u32) -> Self {
        Self { x, y, z: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainTile {
    #[serde(rename = "type")]
    pub terrain: String,
    pub position: Position,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PoiKind,
    pub position: Position,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Quest,
    Treasure,
    Encounter,
    Landmark,
}

impl PoiKind {
    pub const ALL: [PoiKind; 4] = [
        PoiKind::Quest,
        PoiKind::Treasure,
        PoiKind::Encounter,
        PoiKind::Landmark,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub difficulty: u32,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Combat,
    Puzzle,
    Exploration,
    Dialogue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub value: u32,
    pub description: String,
}

impl Reward {
    /// Scale a template reward for a difficulty: `floor(value * (0.8 + difficulty * 0.4))`
    pub fn scaled(&self, id: String, difficulty: f64) -> Self {
        let value = (f64::from(self.value) * (0.8 + difficulty * 0.4)).floor();
        Self {
            id,
            kind: self.kind,
            value: value.max(0.0) as u32,
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Item,
    Experience,
    Currency,
    Reputation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_scaling() {
        let gold = Reward {
            id: "gold_small".to_string(),
            kind: RewardKind::Currency,
            value: 100,
            description: "A small pouch of gold".to_string(),
        };

        assert_eq!(gold.scaled("r1".to_string(), 1.0).value, 120);
        assert_eq!(gold.scaled("r2".to_string(), 2.0).value, 160);
        // Challenge rewards use half the level difficulty
        assert_eq!(gold.scaled("r3".to_string(), 2.5).value, 180);
        assert_eq!(gold.scaled("r4".to_string(), 2.0).id, "r4");
    }

    #[test]
    fn test_tile_at_uses_x_major_order() {
        let dimensions = Dimensions { width: 2, height: 3 };
        let mut terrain = Vec::new();
        for x in 0..2 {
            for y in 0..3 {
                terrain.push(TerrainTile {
                    terrain: format!("{}-{}", x, y),
                    position: Position::flat(x, y),
                    properties: BTreeMap::new(),
                });
            }
        }
        let layout = LevelLayout {
            dimensions,
            terrain,
            points_of_interest: vec![],
        };

        assert_eq!(layout.tile_at(1, 2).map(|t| t.terrain.as_str()), Some("1-2"));
        assert!(layout.tile_at(2, 0).is_none());
    }
}
