//! AI personalities, behavior tuning, and decision types

use serde::{Deserialize, Serialize};

use crate::building::BuildingType;
use crate::core::types::Faction;
use crate::hex::HexCoord;

/// Broad strategy archetypes for computer factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiPersonality {
    Aggressive,
    Defensive,
    Economic,
    Balanced,
    Opportunistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiDifficulty {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl AiDifficulty {
    /// Scaling factor applied to planning depth and attack willingness
    pub fn multiplier(&self) -> f32 {
        match self {
            Self::Easy => 0.7,
            Self::Normal => 1.0,
            Self::Hard => 1.3,
            Self::Expert => 1.6,
        }
    }
}

/// Decision weights and thresholds derived from personality and difficulty
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    pub personality: AiPersonality,
    pub difficulty: AiDifficulty,

    pub aggression_weight: f32,
    pub economic_weight: f32,
    pub defensive_weight: f32,
    pub expansion_weight: f32,

    /// Strength ratio required before committing to an attack
    pub attack_threshold: f32,
    pub retreat_threshold: f32,
    pub building_priority_threshold: f32,

    pub planning_horizon: u32,
    pub reaction_time: u32,

    pub risk_tolerance: f32,
    pub conservatism: f32,
}

impl BehaviorConfig {
    /// Start from balanced weights, shift by personality, scale by difficulty
    pub fn new(personality: AiPersonality, difficulty: AiDifficulty) -> Self {
        let mut config = Self {
            personality,
            difficulty,
            aggression_weight: 0.5,
            economic_weight: 0.5,
            defensive_weight: 0.5,
            expansion_weight: 0.5,
            attack_threshold: 1.2,
            retreat_threshold: 0.3,
            building_priority_threshold: 0.6,
            planning_horizon: 3,
            reaction_time: 1,
            risk_tolerance: 0.5,
            conservatism: 0.5,
        };

        match personality {
            AiPersonality::Aggressive => {
                config.aggression_weight = 0.8;
                config.expansion_weight = 0.7;
                config.attack_threshold = 1.0;
                config.risk_tolerance = 0.8;
            }
            AiPersonality::Defensive => {
                config.defensive_weight = 0.8;
                config.attack_threshold = 1.5;
                config.conservatism = 0.8;
                config.risk_tolerance = 0.3;
            }
            AiPersonality::Economic => {
                config.economic_weight = 0.8;
                config.building_priority_threshold = 0.4;
                config.attack_threshold = 1.8;
                config.conservatism = 0.7;
            }
            AiPersonality::Balanced => {}
            AiPersonality::Opportunistic => {
                config.risk_tolerance = 0.6;
                config.reaction_time = 0;
                config.planning_horizon = 2;
            }
        }

        let multiplier = difficulty.multiplier();
        config.planning_horizon =
            (config.planning_horizon as f32 * multiplier).round() as u32;
        config.attack_threshold /= multiplier;

        config
    }
}

/// A concrete action the AI wants to take
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionKind {
    MoveArmy {
        from: HexCoord,
        to: HexCoord,
    },
    BuildStructure {
        coordinate: HexCoord,
        kind: BuildingType,
    },
    UpgradeBuilding {
        coordinate: HexCoord,
    },
    AttackTarget {
        from: HexCoord,
        target: HexCoord,
    },
    DefendPosition {
        army: HexCoord,
        position: HexCoord,
    },
    ExpandTerritory {
        from: HexCoord,
        target: HexCoord,
    },
}

/// A scored decision; higher priority executes first
#[derive(Debug, Clone)]
pub struct Decision {
    pub kind: DecisionKind,
    pub priority: f32,
}

/// Situation scores on a 0-100 scale, used to gate decision categories
#[derive(Debug, Clone, Copy, Default)]
pub struct SituationReport {
    pub military_strength: f32,
    pub enemy_threat: f32,
    pub defensive_position: f32,
    pub resource_income: f32,
    pub territory_control: f32,
}

/// A remembered enemy army position
#[derive(Debug, Clone, Copy)]
pub struct Sighting {
    pub coordinate: HexCoord,
    pub last_seen: u32,
    pub strength: f32,
}

/// Happenings pushed into the AI for reactive behavior
#[derive(Debug, Clone, Copy)]
pub enum AiEventKind {
    EnemyArmySpotted { location: HexCoord, strength: f32 },
    TerritoryAttacked { location: HexCoord },
}

#[derive(Debug, Clone, Copy)]
pub struct AiEvent {
    pub kind: AiEventKind,
    /// Faction the event concerns; None means everyone
    pub faction: Option<Faction>,
    pub turn: u32,
    pub expires_at: Option<u32>,
}

/// How an executed decision went
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub decision: Decision,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggressive_personality_lowers_attack_bar() {
        let aggressive = BehaviorConfig::new(AiPersonality::Aggressive, AiDifficulty::Normal);
        let defensive = BehaviorConfig::new(AiPersonality::Defensive, AiDifficulty::Normal);
        assert!(aggressive.attack_threshold < defensive.attack_threshold);
        assert!(aggressive.aggression_weight > defensive.aggression_weight);
    }

    #[test]
    fn test_difficulty_scales_planning_and_aggression() {
        let easy = BehaviorConfig::new(AiPersonality::Balanced, AiDifficulty::Easy);
        let expert = BehaviorConfig::new(AiPersonality::Balanced, AiDifficulty::Expert);

        assert!(expert.planning_horizon > easy.planning_horizon);
        // Experts need a smaller advantage before attacking
        assert!(expert.attack_threshold < easy.attack_threshold);
        assert_eq!(expert.planning_horizon, 5);
        assert_eq!(easy.planning_horizon, 2);
    }
}
