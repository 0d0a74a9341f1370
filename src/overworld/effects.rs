//! Building auras: passive effects radiating from completed buildings

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::building::BuildingType;
use crate::core::types::{Faction, Stat, UnitClass};
use crate::hex::HexCoord;
use crate::map::OverworldMap;

/// Which units inside the aura an effect applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectCondition {
    All,
    LeaderOnly,
    SpellcasterOnly,
    MeleeOnly,
    RangedOnly,
}

impl EffectCondition {
    pub fn applies_to(&self, unit: UnitClass) -> bool {
        match self {
            Self::All => true,
            // Leadership lives on squad leaders, not unit classes
            Self::LeaderOnly => false,
            Self::SpellcasterOnly => matches!(unit, UnitClass::Mage),
            Self::MeleeOnly => matches!(
                unit,
                UnitClass::Infantry | UnitClass::HeavyInfantry | UnitClass::Cavalry
            ),
            Self::RangedOnly => matches!(unit, UnitClass::Archer),
        }
    }
}

/// Non-stat effects an aura can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialEffect {
    RecruitmentSpeed,
    Cleanse,
    FoodEfficiency,
    ProficiencyGain,
    MovementRange,
    VisionRange,
}

/// One radiated effect of a building
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    StatBonus(Stat),
    Healing,
    ResourceBonus,
    Special(SpecialEffect),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingEffect {
    pub kind: EffectKind,
    pub value: i32,
    pub range: u32,
    pub condition: EffectCondition,
}

impl BuildingEffect {
    fn new(kind: EffectKind, value: i32, range: u32) -> Self {
        Self {
            kind,
            value,
            range,
            condition: EffectCondition::All,
        }
    }

    fn only(mut self, condition: EffectCondition) -> Self {
        self.condition = condition;
        self
    }
}

/// The aura table for a building kind at a level
pub fn building_effects(kind: BuildingType, level: u32) -> Vec<BuildingEffect> {
    let l = level as i32;
    match kind {
        BuildingType::Settlement => vec![
            BuildingEffect::new(EffectKind::Healing, 5 * l, 1),
            BuildingEffect::new(EffectKind::StatBonus(Stat::Ldr), l, 1)
                .only(EffectCondition::LeaderOnly),
        ],
        BuildingType::Castle => vec![
            BuildingEffect::new(EffectKind::StatBonus(Stat::Arm), 5 * l, 2),
            BuildingEffect::new(EffectKind::Healing, 10 * l, 2),
            BuildingEffect::new(
                EffectKind::Special(SpecialEffect::RecruitmentSpeed),
                25 * l,
                3,
            ),
        ],
        BuildingType::Church => vec![
            BuildingEffect::new(EffectKind::Healing, 15 * l, 2),
            BuildingEffect::new(EffectKind::StatBonus(Stat::Mag), 2 * l, 2)
                .only(EffectCondition::SpellcasterOnly),
            BuildingEffect::new(EffectKind::Special(SpecialEffect::Cleanse), 1, 2),
        ],
        BuildingType::Farm => vec![
            BuildingEffect::new(EffectKind::Healing, 3 * l, 1),
            BuildingEffect::new(EffectKind::Special(SpecialEffect::FoodEfficiency), l, 2),
        ],
        BuildingType::Blacksmith => vec![
            BuildingEffect::new(EffectKind::StatBonus(Stat::Str), 3 * l, 1)
                .only(EffectCondition::MeleeOnly),
            BuildingEffect::new(
                EffectKind::Special(SpecialEffect::ProficiencyGain),
                10 * l,
                1,
            ),
        ],
        BuildingType::Outpost => vec![
            BuildingEffect::new(EffectKind::StatBonus(Stat::Skl), 2 * l, 2),
            BuildingEffect::new(EffectKind::Special(SpecialEffect::MovementRange), l, 2),
        ],
        BuildingType::Tower => vec![
            BuildingEffect::new(EffectKind::StatBonus(Stat::Skl), 4 * l, 3)
                .only(EffectCondition::RangedOnly),
            BuildingEffect::new(EffectKind::Special(SpecialEffect::VisionRange), l + 2, 4),
        ],
        BuildingType::Mine => vec![BuildingEffect::new(EffectKind::ResourceBonus, 10 * l, 1)],
        BuildingType::LumberMill => Vec::new(),
    }
}

/// An aura in effect at some position
#[derive(Debug, Clone)]
pub struct ActiveAura {
    pub building: BuildingType,
    pub level: u32,
    pub distance: u32,
    pub effect: BuildingEffect,
}

/// Aggregated bonuses at one map position
#[derive(Debug, Clone, Default)]
pub struct SquadBonuses {
    /// Bonuses applying to every unit, keyed by stat
    pub stat_bonuses: AHashMap<Stat, i32>,
    pub healing_per_turn: i32,
    pub resource_bonus_percent: i32,
    pub specials: Vec<SpecialEffect>,
    /// Conditional effects, resolved per unit class
    pub conditional: Vec<ActiveAura>,
}

impl SquadBonuses {
    /// Total bonus to one stat for a specific unit class
    pub fn stat_bonus_for(&self, stat: Stat, unit: UnitClass) -> i32 {
        let unconditional = self.stat_bonuses.get(&stat).copied().unwrap_or(0);
        let conditional: i32 = self
            .conditional
            .iter()
            .filter_map(|aura| match aura.effect.kind {
                EffectKind::StatBonus(bonus_stat)
                    if bonus_stat == stat && aura.effect.condition.applies_to(unit) =>
                {
                    Some(aura.effect.value)
                }
                _ => None,
            })
            .sum();
        unconditional + conditional
    }

    pub fn has_special(&self, special: SpecialEffect) -> bool {
        self.specials.contains(&special)
    }
}

/// Collect every friendly aura reaching a position
///
/// Buildings under construction radiate nothing.
pub fn squad_bonuses(map: &OverworldMap, position: HexCoord, faction: Faction) -> SquadBonuses {
    let mut bonuses = SquadBonuses::default();

    for tile in map.iter() {
        let Some(building) = &tile.building else {
            continue;
        };
        if building.faction != faction || !building.is_complete() {
            continue;
        }

        let distance = position.distance(tile.coordinate);
        for effect in building_effects(building.kind, building.level) {
            if distance > effect.range as i32 {
                continue;
            }

            match effect.kind {
                EffectKind::StatBonus(stat) => {
                    if effect.condition == EffectCondition::All {
                        *bonuses.stat_bonuses.entry(stat).or_insert(0) += effect.value;
                    } else {
                        bonuses.conditional.push(ActiveAura {
                            building: building.kind,
                            level: building.level,
                            distance: distance as u32,
                            effect,
                        });
                    }
                }
                EffectKind::Healing => bonuses.healing_per_turn += effect.value,
                EffectKind::ResourceBonus => bonuses.resource_bonus_percent += effect.value,
                EffectKind::Special(special) => {
                    if !bonuses.specials.contains(&special) {
                        bonuses.specials.push(special);
                    }
                }
            }
        }
    }

    bonuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Building, MapTile};
    use crate::terrain::TerrainType;

    fn map_with_building(kind: BuildingType, level: u32, at: (i32, i32)) -> OverworldMap {
        let mut map = OverworldMap::empty(6, 6);
        for row in 0..6 {
            for col in 0..6 {
                map.insert(MapTile::new(
                    HexCoord::from_offset(col, row),
                    TerrainType::Plains,
                ));
            }
        }
        let coordinate = HexCoord::from_offset(at.0, at.1);
        map.get_mut(coordinate).unwrap().building =
            Some(Building::completed(kind, level, Faction::Player));
        map
    }

    #[test]
    fn test_castle_aura_scales_with_level() {
        let effects = building_effects(BuildingType::Castle, 2);
        let armor = effects
            .iter()
            .find(|e| e.kind == EffectKind::StatBonus(Stat::Arm))
            .unwrap();
        assert_eq!(armor.value, 10);
        assert_eq!(armor.range, 2);
    }

    #[test]
    fn test_aura_respects_range() {
        let map = map_with_building(BuildingType::Castle, 1, (2, 2));
        let castle = HexCoord::from_offset(2, 2);

        let near = squad_bonuses(&map, castle, Faction::Player);
        assert_eq!(near.healing_per_turn, 10);
        assert_eq!(near.stat_bonus_for(Stat::Arm, UnitClass::Infantry), 5);

        let far_coord = map
            .iter()
            .map(|tile| tile.coordinate)
            .find(|c| c.distance(castle) > 3)
            .unwrap();
        let far = squad_bonuses(&map, far_coord, Faction::Player);
        assert_eq!(far.healing_per_turn, 0);
        assert!(!far.has_special(SpecialEffect::RecruitmentSpeed));
    }

    #[test]
    fn test_conditional_bonus_filters_by_class() {
        let map = map_with_building(BuildingType::Tower, 1, (2, 2));
        let bonuses = squad_bonuses(&map, HexCoord::from_offset(2, 2), Faction::Player);

        assert_eq!(bonuses.stat_bonus_for(Stat::Skl, UnitClass::Archer), 4);
        assert_eq!(bonuses.stat_bonus_for(Stat::Skl, UnitClass::Infantry), 0);
    }

    #[test]
    fn test_enemy_and_unfinished_buildings_radiate_nothing() {
        let mut map = map_with_building(BuildingType::Church, 1, (2, 2));
        let position = HexCoord::from_offset(2, 2);

        let hostile = squad_bonuses(&map, position, Faction::Enemy);
        assert_eq!(hostile.healing_per_turn, 0);

        map.get_mut(position).unwrap().building =
            Some(Building::under_construction(BuildingType::Church, Faction::Player));
        let unfinished = squad_bonuses(&map, position, Faction::Player);
        assert_eq!(unfinished.healing_per_turn, 0);
    }
}
