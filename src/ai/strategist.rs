//! Scoring heuristics and personality-weighted planning
//!
//! All priorities land on a rough 0-100 scale so decisions from
//! different categories compare sensibly.

use tracing::debug;

use crate::ai::types::{BehaviorConfig, Decision, DecisionKind};
use crate::building::BuildingType;
use crate::core::types::{Faction, ResourceKind, Stockpile};
use crate::hex::HexCoord;
use crate::map::{Army, OverworldMap};
use crate::movement::{self, OffensiveReason};
use crate::terrain;

/// How much the AI wants one unit of a resource
pub fn resource_priority(kind: ResourceKind) -> f32 {
    match kind {
        ResourceKind::Gold => 10.0,
        ResourceKind::Food => 8.0,
        ResourceKind::Steel => 7.0,
        ResourceKind::Wood => 6.0,
        ResourceKind::Stone => 6.0,
        ResourceKind::ManaCrystals => 5.0,
        ResourceKind::Horses => 4.0,
    }
}

pub fn is_economic_building(kind: BuildingType) -> bool {
    matches!(
        kind,
        BuildingType::Farm | BuildingType::Mine | BuildingType::LumberMill
    )
}

pub fn is_military_building(kind: BuildingType) -> bool {
    matches!(
        kind,
        BuildingType::Castle | BuildingType::Outpost | BuildingType::Tower
    )
}

pub fn army_strength(army: &Army) -> f32 {
    army.total_strength()
}

/// How dangerous an enemy army is to a faction
///
/// Base threat scales with squad count; it decays with distance to
/// the faction's nearest territory, bottoming out at 10%.
pub fn threat_level(map: &OverworldMap, faction: Faction, at: HexCoord, army: &Army) -> f32 {
    let base = army.squads.len() as f32 * 20.0;
    let nearest = map
        .tiles_of(faction)
        .map(|tile| tile.coordinate.distance(at))
        .min();

    let falloff = match nearest {
        Some(distance) => (1.0 - distance as f32 / 10.0).max(0.1),
        None => 0.1,
    };
    base * falloff
}

/// Worth of claiming a tile, weighted by personality
pub fn expansion_value(
    map: &OverworldMap,
    coordinate: HexCoord,
    config: &BehaviorConfig,
) -> f32 {
    let Some(tile) = map.get(coordinate) else {
        return 0.0;
    };

    let mut value = 10.0;
    if let Some(building) = &tile.building {
        value += 50.0;
        if is_economic_building(building.kind) {
            value += 30.0 * config.economic_weight;
        }
        if is_military_building(building.kind) {
            value += 25.0 * config.defensive_weight;
        }
    }
    if tile.terrain.is_high_ground() {
        value += 15.0;
    }
    value + 5.0
}

/// Worth of constructing a building, from its yield
pub fn building_value(kind: BuildingType) -> f32 {
    let generation: f32 = kind
        .base_generation()
        .iter()
        .map(|(resource, amount)| *amount as f32 * resource_priority(*resource))
        .sum();
    generation + 10.0
}

/// Worth of a military building at a site, from threats and borders
pub fn military_building_value(
    map: &OverworldMap,
    site: HexCoord,
    threats: &[(HexCoord, f32)],
    faction: Faction,
) -> f32 {
    let mut value = 20.0;

    let nearby = threats
        .iter()
        .filter(|(coordinate, _)| coordinate.distance(site) <= 5)
        .count();
    value += nearby as f32 * 15.0;

    let border = map
        .existing_neighbors(site)
        .iter()
        .filter(|tile| tile.controlled_by != faction)
        .count();
    value + border as f32 * 10.0
}

/// Personality-weighted planner for one faction
pub struct Strategist {
    pub faction: Faction,
    pub config: BehaviorConfig,
}

impl Strategist {
    pub fn new(faction: Faction, config: BehaviorConfig) -> Self {
        Self { faction, config }
    }

    /// Propose moves for every army, shaped by personality weights
    pub fn propose_army_moves(
        &self,
        map: &OverworldMap,
        base_movement: f32,
        threats: &[(HexCoord, f32)],
    ) -> Vec<Decision> {
        let mut decisions: Vec<Decision> = Vec::new();

        for tile in map.armies_of(self.faction) {
            let Some(army) = &tile.army else {
                continue;
            };
            let position = tile.coordinate;
            let range = movement::army_movement_range(army, base_movement);
            let options = movement::strategic_options(
                map,
                position,
                range,
                self.faction,
                &army.movement_skills,
            );

            if self.config.aggression_weight > 0.5 {
                for target in options.offensive.iter().take(3) {
                    let kind = match target.reason {
                        OffensiveReason::EnemyArmy => DecisionKind::AttackTarget {
                            from: position,
                            target: target.coordinate,
                        },
                        OffensiveReason::EnemyBuilding(_) => DecisionKind::MoveArmy {
                            from: position,
                            to: target.coordinate,
                        },
                    };
                    decisions.push(Decision {
                        kind,
                        priority: target.score * self.config.aggression_weight,
                    });
                }
            }

            if self.config.expansion_weight > 0.4 {
                for target in options.economic.iter().take(2) {
                    decisions.push(Decision {
                        kind: DecisionKind::ExpandTerritory {
                            from: position,
                            target: target.coordinate,
                        },
                        priority: target.score * self.config.expansion_weight * 0.8,
                    });
                }
            }

            if self.config.defensive_weight > 0.3 {
                let threatened = threats.iter().any(|(coordinate, _)| {
                    coordinate.distance(position) as f32 <= range + 2.0
                });
                if threatened {
                    if let Some(best) = options.defensive.first() {
                        decisions.push(Decision {
                            kind: DecisionKind::DefendPosition {
                                army: position,
                                position: best.coordinate,
                            },
                            priority: best.score * self.config.defensive_weight * 0.9,
                        });
                    }
                }
            }
        }

        decisions
    }

    /// Propose construction on owned empty tiles
    pub fn propose_construction(
        &self,
        map: &OverworldMap,
        stockpile: &Stockpile,
        threats: &[(HexCoord, f32)],
    ) -> Vec<Decision> {
        let mut decisions: Vec<Decision> = Vec::new();

        let sites: Vec<HexCoord> = map
            .tiles_of(self.faction)
            .filter(|tile| tile.building.is_none() && tile.army.is_none())
            .map(|tile| tile.coordinate)
            .collect();

        for site in sites {
            let Some(tile) = map.get(site) else {
                continue;
            };

            if self.config.economic_weight > 0.4 {
                for kind in [
                    BuildingType::Farm,
                    BuildingType::Mine,
                    BuildingType::LumberMill,
                ] {
                    if !terrain::can_build_on(tile.terrain, kind) {
                        continue;
                    }
                    if !stockpile.can_afford(kind.build_cost()) {
                        continue;
                    }
                    decisions.push(Decision {
                        kind: DecisionKind::BuildStructure {
                            coordinate: site,
                            kind,
                        },
                        priority: building_value(kind) * self.config.economic_weight * 0.7,
                    });
                }
            }

            if self.config.defensive_weight > 0.3 || self.config.aggression_weight > 0.6 {
                for kind in [
                    BuildingType::Outpost,
                    BuildingType::Castle,
                    BuildingType::Tower,
                ] {
                    if !terrain::can_build_on(tile.terrain, kind) {
                        continue;
                    }
                    if !stockpile.can_afford(kind.build_cost()) {
                        continue;
                    }
                    let value = military_building_value(map, site, threats, self.faction);
                    decisions.push(Decision {
                        kind: DecisionKind::BuildStructure {
                            coordinate: site,
                            kind,
                        },
                        priority: value
                            * (self.config.defensive_weight + self.config.aggression_weight)
                            * 0.6,
                    });
                }
            }
        }

        decisions
    }

    /// Propose upgrades for buildings below their max level
    pub fn propose_upgrades(
        &self,
        map: &OverworldMap,
        stockpile: &Stockpile,
    ) -> Vec<Decision> {
        let mut decisions: Vec<Decision> = Vec::new();

        for tile in map.buildings_of(self.faction) {
            let Some(building) = &tile.building else {
                continue;
            };
            if !building.is_complete() {
                continue;
            }
            let Some(cost) = building.kind.upgrade_cost(building.level) else {
                continue;
            };
            if !stockpile.can_afford(cost) {
                continue;
            }

            let generation: f32 = building
                .kind
                .base_generation()
                .iter()
                .map(|(_, amount)| *amount as f32)
                .sum();
            let mut priority = generation * 5.0;

            if is_economic_building(building.kind) {
                priority *= self.config.economic_weight;
            } else if is_military_building(building.kind) {
                priority *=
                    (self.config.defensive_weight + self.config.aggression_weight) / 2.0;
            }

            decisions.push(Decision {
                kind: DecisionKind::UpgradeBuilding {
                    coordinate: tile.coordinate,
                },
                priority,
            });
        }

        decisions
    }

    /// Full proposal set for one turn, unsorted
    pub fn plan(
        &self,
        map: &OverworldMap,
        stockpile: &Stockpile,
        base_movement: f32,
        threats: &[(HexCoord, f32)],
    ) -> Vec<Decision> {
        let mut decisions = self.propose_army_moves(map, base_movement, threats);
        decisions.extend(self.propose_construction(map, stockpile, threats));
        decisions.extend(self.propose_upgrades(map, stockpile));
        debug!(
            faction = ?self.faction,
            proposals = decisions.len(),
            "strategist proposals generated"
        );
        decisions
    }
}
