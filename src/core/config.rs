//! Overworld configuration with documented constants
//!
//! The tuning values that shape campaign pacing are collected here with
//! explanations of their purpose, instead of being scattered as magic
//! numbers through the systems.

use serde::Deserialize;

use crate::core::error::Result;
use crate::core::types::{ResourceKind, Stockpile};

/// Starting resource amounts for one faction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StartingResources {
    pub gold: u32,
    pub wood: u32,
    pub stone: u32,
    pub steel: u32,
    pub food: u32,
    pub mana_crystals: u32,
    pub horses: u32,
}

impl StartingResources {
    pub fn to_stockpile(&self) -> Stockpile {
        Stockpile::from_amounts(&[
            (ResourceKind::Gold, self.gold),
            (ResourceKind::Wood, self.wood),
            (ResourceKind::Stone, self.stone),
            (ResourceKind::Steel, self.steel),
            (ResourceKind::Food, self.food),
            (ResourceKind::ManaCrystals, self.mana_crystals),
            (ResourceKind::Horses, self.horses),
        ])
    }
}

impl Default for StartingResources {
    fn default() -> Self {
        Self {
            gold: 500,
            wood: 100,
            stone: 50,
            steel: 25,
            food: 200,
            mana_crystals: 10,
            horses: 5,
        }
    }
}

/// Configuration for the strategic overworld
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverworldConfig {
    // === MAP ===
    /// Map width in offset columns
    ///
    /// Together with `map_height` this bounds the tile graph. The engine
    /// is tuned for small maps (tens to a few hundred tiles).
    pub map_width: i32,

    /// Map height in offset rows
    pub map_height: i32,

    /// Seed for the campaign RNG
    ///
    /// Event rolls are drawn from a seeded ChaCha8 stream, so two campaigns
    /// with the same seed and the same orders replay identically.
    pub seed: u64,

    // === ARMIES ===
    /// Movement point budget for a freshly placed army
    ///
    /// Composition adjusts this per army (cavalry up, heavy infantry down);
    /// see `movement::army_movement_range`.
    pub base_movement_points: f32,

    // === EVENTS ===
    /// Chance per turn that a random strategic event fires
    ///
    /// At 0.1 a campaign sees an event roughly every ten turns.
    pub event_chance: f64,

    // === AI ===
    /// How many candidate decisions an AI faction keeps after scoring
    pub ai_plan_depth: usize,

    /// How many of the kept decisions are executed each turn
    ///
    /// Keeping this below `ai_plan_depth` leaves the AI slack to discard
    /// decisions invalidated by earlier ones in the same turn.
    pub ai_actions_per_turn: usize,

    /// Strength advantage required before the AI commits to an attack
    ///
    /// 1.2 means the attacker wants at least a 20% edge. Difficulty
    /// scaling divides this, making expert AIs more willing to fight.
    pub attack_advantage: f32,

    // === LOG ===
    /// Maximum retained event log entries
    pub log_capacity: usize,

    // === STARTING ECONOMY ===
    pub player_resources: StartingResources,
    pub enemy_resources: StartingResources,
}

impl Default for OverworldConfig {
    fn default() -> Self {
        Self {
            map_width: 20,
            map_height: 15,
            seed: 0,
            base_movement_points: 3.0,
            event_chance: 0.1,
            ai_plan_depth: 5,
            ai_actions_per_turn: 3,
            attack_advantage: 1.2,
            log_capacity: 64,
            player_resources: StartingResources::default(),
            enemy_resources: StartingResources {
                gold: 300,
                wood: 75,
                stone: 40,
                steel: 15,
                food: 150,
                mana_crystals: 5,
                horses: 3,
            },
        }
    }
}

impl OverworldConfig {
    /// Parse a config from TOML; missing fields fall back to defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_baseline() {
        let config = OverworldConfig::default();
        assert_eq!(config.map_width, 20);
        assert_eq!(config.map_height, 15);
        assert_eq!(config.player_resources.gold, 500);
        assert_eq!(config.enemy_resources.gold, 300);
    }

    #[test]
    fn test_from_toml_partial_override() {
        let config = OverworldConfig::from_toml_str(
            r#"
            map_width = 8
            map_height = 6
            seed = 99

            [enemy_resources]
            gold = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.map_width, 8);
        assert_eq!(config.seed, 99);
        assert_eq!(config.enemy_resources.gold, 1000);
        // Unset fields keep their defaults
        assert_eq!(config.event_chance, 0.1);
        assert_eq!(config.enemy_resources.wood, StartingResources::default().wood);
    }

    #[test]
    fn test_starting_resources_to_stockpile() {
        let stockpile = StartingResources::default().to_stockpile();
        assert_eq!(stockpile.get(ResourceKind::Gold), 500);
        assert_eq!(stockpile.get(ResourceKind::Horses), 5);
    }
}
