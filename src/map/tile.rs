//! Tile contents: buildings and armies

use serde::{Deserialize, Serialize};

use crate::building::BuildingType;
use crate::core::types::{Faction, Squad};
use crate::hex::HexCoord;
use crate::terrain::{MovementSkill, TerrainType};

/// A structure occupying a tile, possibly still under construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingType,
    pub level: u32,
    pub faction: Faction,
    /// Percent complete while under construction; None once finished
    pub construction_progress: Option<f32>,
}

impl Building {
    pub fn completed(kind: BuildingType, level: u32, faction: Faction) -> Self {
        Self {
            kind,
            level,
            faction,
            construction_progress: None,
        }
    }

    pub fn under_construction(kind: BuildingType, faction: Faction) -> Self {
        Self {
            kind,
            level: 1,
            faction,
            construction_progress: Some(0.0),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.construction_progress.is_none()
    }
}

/// A stack of squads occupying one tile and moving as a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Army {
    pub squads: Vec<Squad>,
    pub faction: Faction,
    pub movement_points: f32,
    pub max_movement_points: f32,
    pub movement_skills: Vec<MovementSkill>,
}

impl Army {
    pub fn new(faction: Faction, squads: Vec<Squad>, movement_points: f32) -> Self {
        Self {
            squads,
            faction,
            movement_points,
            max_movement_points: movement_points,
            movement_skills: Vec::new(),
        }
    }

    pub fn with_skills(mut self, skills: Vec<MovementSkill>) -> Self {
        self.movement_skills = skills;
        self
    }

    pub fn total_strength(&self) -> f32 {
        self.squads.iter().map(|squad| squad.strength).sum()
    }

    /// Fraction of units in the army belonging to classes the predicate accepts
    pub fn class_fraction(&self, predicate: impl Fn(&crate::core::types::UnitClass) -> bool) -> f32 {
        let total: usize = self.squads.iter().map(|squad| squad.units.len()).sum();
        if total == 0 {
            return 0.0;
        }
        let matching: usize = self
            .squads
            .iter()
            .flat_map(|squad| squad.units.iter())
            .filter(|unit| predicate(unit))
            .count();
        matching as f32 / total as f32
    }
}

/// One hex of the strategic map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapTile {
    pub coordinate: HexCoord,
    pub terrain: TerrainType,
    pub building: Option<Building>,
    pub army: Option<Army>,
    pub controlled_by: Faction,
    pub is_capital: bool,
    pub is_strategic_point: bool,
}

impl MapTile {
    pub fn new(coordinate: HexCoord, terrain: TerrainType) -> Self {
        Self {
            coordinate,
            terrain,
            building: None,
            army: None,
            controlled_by: Faction::Neutral,
            is_capital: false,
            is_strategic_point: false,
        }
    }

    /// Combined percent defense bonus of terrain and any completed building
    pub fn defensive_bonus(&self) -> u32 {
        let terrain = self.terrain.defensive_bonus();
        let building = self
            .building
            .as_ref()
            .filter(|b| b.is_complete())
            .map(|b| b.kind.defensive_bonus_at_level(b.level))
            .unwrap_or(0);
        terrain + building
    }

    pub fn has_hostile_army(&self, faction: Faction) -> bool {
        self.army
            .as_ref()
            .map(|army| army.faction.is_hostile_to(&faction))
            .unwrap_or(false)
    }

    /// Any army on the tile belonging to a different faction, allied or not
    pub fn has_foreign_army(&self, faction: Faction) -> bool {
        self.army
            .as_ref()
            .map(|army| army.faction != faction)
            .unwrap_or(false)
    }
}
