//! Terrain property tables for the strategic map
//!
//! Every terrain kind carries static movement, combat, build, and yield
//! data. Movement skills (flight, water walking, ...) gate the harsher
//! terrain and normalize its step cost.

use serde::{Deserialize, Serialize};

use crate::building::BuildingType;
use crate::core::types::ResourceKind;

/// Terrain types affecting movement, combat, and construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    Plains,
    Forest,
    Hills,
    Mountains,
    River,
    Swamp,
    Desert,
    Snow,
}

impl Default for TerrainType {
    fn default() -> Self {
        Self::Plains
    }
}

/// Special movement abilities an army can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementSkill {
    Flight,
    WaterWalking,
    MountainClimbing,
    SwampWalking,
    ColdResistance,
}

/// Combat modifiers granted (or inflicted) by terrain
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CombatModifiers {
    pub evasion_bonus: i32,
    pub ranged_modifier: i32,
    pub magic_bonus: i32,
    pub healing_bonus: i32,
}

impl TerrainType {
    pub const ALL: [TerrainType; 8] = [
        TerrainType::Plains,
        TerrainType::Forest,
        TerrainType::Hills,
        TerrainType::Mountains,
        TerrainType::River,
        TerrainType::Swamp,
        TerrainType::Desert,
        TerrainType::Snow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plains => "Plains",
            Self::Forest => "Forest",
            Self::Hills => "Hills",
            Self::Mountains => "Mountains",
            Self::River => "River",
            Self::Swamp => "Swamp",
            Self::Desert => "Desert",
            Self::Snow => "Snow",
        }
    }

    /// Base movement cost to enter a tile of this terrain
    pub fn movement_cost(&self) -> f32 {
        match self {
            Self::Plains => 1.0,
            Self::Forest => 1.5,
            Self::Hills => 1.2,
            Self::Mountains => 2.0,
            Self::River => 3.0,
            Self::Swamp => 2.5,
            Self::Desert => 1.3,
            Self::Snow => 1.8,
        }
    }

    /// Percent bonus to defense when defending in this terrain
    pub fn defensive_bonus(&self) -> u32 {
        match self {
            Self::Plains => 0,
            Self::Forest => 10,
            Self::Hills => 15,
            Self::Mountains => 25,
            Self::River => 5,
            Self::Swamp => 5,
            Self::Desert => 0,
            Self::Snow => 5,
        }
    }

    pub fn combat_modifiers(&self) -> CombatModifiers {
        match self {
            Self::Plains => CombatModifiers::default(),
            Self::Forest => CombatModifiers { evasion_bonus: 10, ranged_modifier: -20, ..Default::default() },
            Self::Hills => CombatModifiers { ranged_modifier: 15, ..Default::default() },
            Self::Mountains => CombatModifiers { ranged_modifier: 20, ..Default::default() },
            Self::River => CombatModifiers { healing_bonus: 5, ..Default::default() },
            Self::Swamp => CombatModifiers { evasion_bonus: 5, ranged_modifier: -15, ..Default::default() },
            Self::Desert => CombatModifiers { ranged_modifier: -10, ..Default::default() },
            Self::Snow => CombatModifiers { evasion_bonus: -5, ..Default::default() },
        }
    }

    /// Building kinds that may be constructed on this terrain
    pub fn buildable(&self) -> &'static [BuildingType] {
        match self {
            Self::Plains => &[
                BuildingType::Settlement,
                BuildingType::Farm,
                BuildingType::Outpost,
                BuildingType::Tower,
            ],
            Self::Forest => &[
                BuildingType::Outpost,
                BuildingType::LumberMill,
                BuildingType::Tower,
            ],
            Self::Hills => &[
                BuildingType::Castle,
                BuildingType::Tower,
                BuildingType::Mine,
                BuildingType::Outpost,
            ],
            Self::Mountains => &[BuildingType::Mine, BuildingType::Tower],
            Self::River => &[BuildingType::Farm, BuildingType::LumberMill],
            Self::Swamp => &[],
            Self::Desert => &[BuildingType::Outpost, BuildingType::Tower],
            Self::Snow => &[BuildingType::Outpost],
        }
    }

    /// Per-turn resource yield of a controlled tile
    pub fn resource_yield(&self) -> &'static [(ResourceKind, u32)] {
        match self {
            Self::Plains => &[(ResourceKind::Food, 1)],
            Self::Forest => &[(ResourceKind::Wood, 2)],
            Self::Hills => &[(ResourceKind::Stone, 1)],
            Self::Mountains => &[
                (ResourceKind::Stone, 2),
                (ResourceKind::Steel, 1),
                (ResourceKind::ManaCrystals, 1),
            ],
            Self::River => &[(ResourceKind::Food, 2)],
            Self::Swamp => &[],
            Self::Desert => &[],
            Self::Snow => &[],
        }
    }

    /// Skills that unlock this terrain; empty means freely passable
    pub fn required_skills(&self) -> &'static [MovementSkill] {
        match self {
            Self::Mountains => &[MovementSkill::MountainClimbing],
            Self::River => &[MovementSkill::WaterWalking, MovementSkill::Flight],
            Self::Swamp => &[MovementSkill::SwampWalking],
            Self::Snow => &[MovementSkill::ColdResistance],
            _ => &[],
        }
    }

    /// Whether an army with the given skills may enter this terrain
    pub fn passable_for(&self, skills: &[MovementSkill]) -> bool {
        let required = self.required_skills();
        if required.is_empty() {
            return true;
        }
        required.iter().any(|req| skills.contains(req)) || skills.contains(&MovementSkill::Flight)
    }

    /// Cost to enter a tile of this terrain for an army with the given skills
    ///
    /// Meeting a terrain's skill requirement, or flying, normalizes the
    /// step to base cost 1.0.
    pub fn step_cost(&self, skills: &[MovementSkill]) -> f32 {
        let required = self.required_skills();
        if !required.is_empty() && required.iter().any(|req| skills.contains(req)) {
            return 1.0;
        }
        if skills.contains(&MovementSkill::Flight) {
            return 1.0;
        }
        self.movement_cost()
    }

    /// Whether this terrain grants a meaningful height advantage
    pub fn is_high_ground(&self) -> bool {
        matches!(self, Self::Hills | Self::Mountains)
    }
}

/// Check whether a building kind may be constructed on a terrain
pub fn can_build_on(terrain: TerrainType, building: BuildingType) -> bool {
    terrain.buildable().contains(&building)
}
