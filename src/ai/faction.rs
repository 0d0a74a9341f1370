//! Computer-controlled faction turns: intelligence, planning, execution

use std::cmp::Reverse;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use tracing::{debug, info, warn};

use crate::ai::strategist::{self, Strategist};
use crate::ai::types::{
    ActionOutcome, AiDifficulty, AiEvent, AiEventKind, AiPersonality, BehaviorConfig, Decision,
    DecisionKind, SituationReport, Sighting,
};
use crate::building::BuildingType;
use crate::core::error::{OverworldError, Result};
use crate::core::types::Faction;
use crate::hex::HexCoord;
use crate::map::{MapTile, OverworldMap};
use crate::overworld::OverworldManager;
use crate::terrain::TerrainType;

/// What an AI faction remembers between turns
#[derive(Debug, Default)]
pub struct FactionMemory {
    pub sightings: AHashMap<HexCoord, Sighting>,
    pub threat_by_faction: AHashMap<Faction, f32>,
    pub territory_value: AHashMap<HexCoord, f32>,
}

struct FactionBrain {
    config: BehaviorConfig,
    memory: FactionMemory,
}

/// Drives every computer-controlled faction
#[derive(Default)]
pub struct AiFactionManager {
    brains: AHashMap<Faction, FactionBrain>,
    events: Vec<AiEvent>,
}

impl AiFactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_faction(
        &mut self,
        faction: Faction,
        personality: AiPersonality,
        difficulty: AiDifficulty,
    ) {
        self.brains.insert(
            faction,
            FactionBrain {
                config: BehaviorConfig::new(personality, difficulty),
                memory: FactionMemory::default(),
            },
        );
        info!(?faction, ?personality, ?difficulty, "ai faction initialized");
    }

    pub fn is_initialized(&self, faction: Faction) -> bool {
        self.brains.contains_key(&faction)
    }

    /// Queue an event for reactive behavior
    pub fn push_event(&mut self, event: AiEvent) {
        self.events.push(event);
    }

    pub fn memory(&self, faction: Faction) -> Option<&FactionMemory> {
        self.brains.get(&faction).map(|brain| &brain.memory)
    }

    pub fn behavior(&self, faction: Faction) -> Option<&BehaviorConfig> {
        self.brains.get(&faction).map(|brain| &brain.config)
    }

    /// Run one full AI turn for a faction
    ///
    /// Intelligence is refreshed, queued events are absorbed, a plan
    /// is drawn up, and its top decisions are executed against the
    /// campaign. Decisions invalidated by earlier ones in the same
    /// turn fail soft and are reported as unsuccessful outcomes.
    pub fn take_turn(
        &mut self,
        manager: &mut OverworldManager,
        faction: Faction,
    ) -> Result<Vec<ActionOutcome>> {
        if !self.brains.contains_key(&faction) {
            return Err(OverworldError::FactionNotInitialized(faction));
        }

        self.update_intelligence(manager, faction);
        self.absorb_events(manager, faction);

        let report = self.assess_situation(manager, faction);
        let mut decisions = self.gated_decisions(manager, faction, &report);

        let brain = self
            .brains
            .get(&faction)
            .ok_or(OverworldError::FactionNotInitialized(faction))?;
        let threats: Vec<(HexCoord, f32)> = brain
            .memory
            .sightings
            .values()
            .map(|sighting| (sighting.coordinate, sighting.strength))
            .collect();
        let strategist = Strategist::new(faction, brain.config.clone());
        decisions.extend(strategist.plan(
            manager.map(),
            manager.resources(faction)?,
            manager.config().base_movement_points,
            &threats,
        ));

        decisions.sort_by_key(|decision| Reverse(OrderedFloat(decision.priority)));
        decisions.truncate(manager.config().ai_plan_depth);

        let budget = manager.config().ai_actions_per_turn;
        let mut outcomes: Vec<ActionOutcome> = Vec::new();
        for decision in decisions.into_iter().take(budget) {
            let success = self.execute(manager, faction, &decision);
            outcomes.push(ActionOutcome { decision, success });
        }

        debug!(
            ?faction,
            executed = outcomes.len(),
            succeeded = outcomes.iter().filter(|o| o.success).count(),
            "ai turn finished"
        );
        Ok(outcomes)
    }

    /// Refresh sightings, per-faction threat totals, and tile values
    fn update_intelligence(&mut self, manager: &OverworldManager, faction: Faction) {
        let Some(brain) = self.brains.get_mut(&faction) else {
            return;
        };
        let map = manager.map();
        let turn = manager.current_turn();

        for tile in map.iter() {
            let Some(army) = &tile.army else {
                continue;
            };
            if army.faction == faction {
                continue;
            }
            brain.memory.sightings.insert(
                tile.coordinate,
                Sighting {
                    coordinate: tile.coordinate,
                    last_seen: turn,
                    strength: strategist::army_strength(army),
                },
            );
        }

        brain.memory.threat_by_faction.clear();
        for tile in map.iter() {
            let Some(army) = &tile.army else {
                continue;
            };
            if army.faction == faction {
                continue;
            }
            *brain
                .memory
                .threat_by_faction
                .entry(army.faction)
                .or_insert(0.0) += strategist::army_strength(army);
        }

        brain.memory.territory_value.clear();
        for tile in map.iter() {
            let mut value = 10.0;
            value += match tile.terrain {
                TerrainType::Mountains => 20.0,
                TerrainType::Plains => 15.0,
                TerrainType::Hills => 10.0,
                _ => 0.0,
            };
            if tile.building.is_some() {
                value += 30.0;
            }

            let neighbors = map.existing_neighbors(tile.coordinate);
            let friendly = neighbors
                .iter()
                .filter(|n| n.controlled_by == faction)
                .count();
            let hostile = neighbors
                .iter()
                .filter(|n| n.controlled_by != faction && n.controlled_by != Faction::Neutral)
                .count();
            value += friendly as f32 * 5.0;
            // Border tiles matter more
            value += hostile as f32 * 10.0;

            brain.memory.territory_value.insert(tile.coordinate, value);
        }
    }

    /// Fold queued events into memory and drop expired ones
    fn absorb_events(&mut self, manager: &OverworldManager, faction: Faction) {
        let turn = manager.current_turn();
        let Some(brain) = self.brains.get_mut(&faction) else {
            return;
        };

        for event in &self.events {
            if event.faction.is_some() && event.faction != Some(faction) {
                continue;
            }
            match event.kind {
                AiEventKind::EnemyArmySpotted { location, strength } => {
                    brain.memory.sightings.insert(
                        location,
                        Sighting {
                            coordinate: location,
                            last_seen: event.turn,
                            strength,
                        },
                    );
                }
                AiEventKind::TerritoryAttacked { location } => {
                    *brain.memory.territory_value.entry(location).or_insert(0.0) += 20.0;
                }
            }
        }

        self.events
            .retain(|event| event.expires_at.map(|at| at > turn).unwrap_or(true));
    }

    /// Boil the campaign down to 0-100 gauges
    fn assess_situation(&self, manager: &OverworldManager, faction: Faction) -> SituationReport {
        let map = manager.map();

        let mut territory = 0usize;
        let mut buildings = 0usize;
        let mut strength = 0.0f32;
        for tile in map.iter() {
            if tile.controlled_by == faction {
                territory += 1;
                if tile.building.is_some() {
                    buildings += 1;
                }
            }
            if let Some(army) = &tile.army {
                if army.faction == faction {
                    strength += strategist::army_strength(army);
                }
            }
        }

        let total_threat: f32 = self
            .brains
            .get(&faction)
            .map(|brain| brain.memory.threat_by_faction.values().sum())
            .unwrap_or(0.0);

        SituationReport {
            military_strength: (strength / 10.0).min(100.0),
            enemy_threat: (total_threat / 10.0).min(100.0),
            defensive_position: (buildings as f32 * 10.0).min(100.0),
            resource_income: (buildings as f32 * 15.0).min(100.0),
            territory_control: (territory as f32 * 5.0).min(100.0),
        }
    }

    /// Decision categories unlocked by the situation report
    fn gated_decisions(
        &self,
        manager: &OverworldManager,
        faction: Faction,
        report: &SituationReport,
    ) -> Vec<Decision> {
        let Some(brain) = self.brains.get(&faction) else {
            return Vec::new();
        };
        let config = &brain.config;
        let map = manager.map();
        let mut decisions: Vec<Decision> = Vec::new();

        if report.resource_income < 50.0 {
            decisions.extend(self.economic_decisions(manager, faction, report));
        }
        if report.enemy_threat > 60.0 || config.aggression_weight > 0.6 {
            decisions.extend(self.military_decisions(manager, faction));
        }
        if report.territory_control < 40.0 && config.expansion_weight > 0.5 {
            decisions.extend(self.expansion_decisions(map, faction, brain));
        }
        if report.defensive_position < 50.0 || config.defensive_weight > 0.6 {
            decisions.extend(self.defensive_decisions(map, faction));
        }

        decisions
    }

    /// Farms when food income is desperate, mines on mountains otherwise
    fn economic_decisions(
        &self,
        manager: &OverworldManager,
        faction: Faction,
        report: &SituationReport,
    ) -> Vec<Decision> {
        let map = manager.map();
        let Ok(stockpile) = manager.resources(faction) else {
            return Vec::new();
        };
        let mut decisions: Vec<Decision> = Vec::new();

        let sites: Vec<&MapTile> = map
            .tiles_of(faction)
            .filter(|tile| tile.building.is_none() && tile.army.is_none())
            .collect();

        if report.resource_income < 30.0 {
            if let Some(site) = sites
                .iter()
                .find(|tile| tile.terrain == TerrainType::Plains)
            {
                if stockpile.can_afford(BuildingType::Farm.build_cost()) {
                    decisions.push(Decision {
                        kind: DecisionKind::BuildStructure {
                            coordinate: site.coordinate,
                            kind: BuildingType::Farm,
                        },
                        priority: 85.0,
                    });
                }
            }
        }

        if let Some(site) = sites
            .iter()
            .find(|tile| tile.terrain == TerrainType::Mountains)
        {
            if stockpile.can_afford(BuildingType::Mine.build_cost()) {
                decisions.push(Decision {
                    kind: DecisionKind::BuildStructure {
                        coordinate: site.coordinate,
                        kind: BuildingType::Mine,
                    },
                    priority: 70.0,
                });
            }
        }

        decisions
    }

    /// Attack the weakest enemy concentrations we clearly outmatch
    fn military_decisions(&self, manager: &OverworldManager, faction: Faction) -> Vec<Decision> {
        let Some(brain) = self.brains.get(&faction) else {
            return Vec::new();
        };
        let map = manager.map();
        let mut decisions: Vec<Decision> = Vec::new();

        let mut targets: Vec<(HexCoord, f32)> = map
            .iter()
            .filter_map(|tile| {
                let army = tile.army.as_ref()?;
                if army.faction == faction {
                    return None;
                }
                Some((tile.coordinate, strategist::army_strength(army)))
            })
            .collect();
        // Weakest first
        targets.sort_by_key(|(_, strength)| OrderedFloat(*strength));

        for (target, enemy_strength) in targets.into_iter().take(2) {
            let nearby: Vec<(HexCoord, f32)> = map
                .armies_of(faction)
                .filter(|tile| tile.coordinate.distance(target) <= 5)
                .filter_map(|tile| {
                    tile.army
                        .as_ref()
                        .map(|army| (tile.coordinate, strategist::army_strength(army)))
                })
                .collect();
            if nearby.is_empty() {
                continue;
            }

            let our_strength: f32 = nearby.iter().map(|(_, s)| s).sum();
            if our_strength <= enemy_strength * brain.config.attack_threshold {
                continue;
            }

            let closest = nearby
                .iter()
                .min_by_key(|(coordinate, _)| coordinate.distance(target))
                .map(|(coordinate, _)| *coordinate);
            if let Some(from) = closest {
                decisions.push(Decision {
                    kind: DecisionKind::AttackTarget { from, target },
                    priority: 80.0,
                });
            }
        }

        decisions
    }

    /// Claim the most valuable neutral tiles an army can reach
    fn expansion_decisions(
        &self,
        map: &OverworldMap,
        faction: Faction,
        brain: &FactionBrain,
    ) -> Vec<Decision> {
        let mut targets: Vec<(HexCoord, f32)> = map
            .iter()
            .filter(|tile| tile.controlled_by == Faction::Neutral)
            .map(|tile| {
                let value = brain
                    .memory
                    .territory_value
                    .get(&tile.coordinate)
                    .copied()
                    .unwrap_or(0.0);
                (tile.coordinate, value)
            })
            .collect();
        targets.sort_by_key(|(_, value)| Reverse(OrderedFloat(*value)));

        let mut decisions: Vec<Decision> = Vec::new();
        for (target, _) in targets.into_iter().take(3) {
            let nearest_army = map
                .armies_of(faction)
                .filter(|tile| tile.coordinate.distance(target) <= 5)
                .min_by_key(|tile| tile.coordinate.distance(target))
                .map(|tile| tile.coordinate);
            if let Some(from) = nearest_army {
                decisions.push(Decision {
                    kind: DecisionKind::ExpandTerritory { from, target },
                    priority: 60.0,
                });
            }
        }

        decisions
    }

    /// Fortify unprotected border tiles and garrison them
    fn defensive_decisions(&self, map: &OverworldMap, faction: Faction) -> Vec<Decision> {
        let vulnerable: Vec<HexCoord> = map
            .tiles_of(faction)
            .filter(|tile| {
                tile.building.is_none()
                    && map.existing_neighbors(tile.coordinate).iter().any(|n| {
                        n.controlled_by != faction && n.controlled_by != Faction::Neutral
                    })
            })
            .map(|tile| tile.coordinate)
            .collect();

        let mut decisions: Vec<Decision> = Vec::new();
        for position in vulnerable.into_iter().take(2) {
            decisions.push(Decision {
                kind: DecisionKind::BuildStructure {
                    coordinate: position,
                    kind: BuildingType::Outpost,
                },
                priority: 75.0,
            });

            let garrison = map
                .armies_of(faction)
                .filter(|tile| tile.coordinate.distance(position) <= 5)
                .min_by_key(|tile| tile.coordinate.distance(position))
                .map(|tile| tile.coordinate);
            if let Some(army) = garrison {
                decisions.push(Decision {
                    kind: DecisionKind::DefendPosition { army, position },
                    priority: 65.0,
                });
            }
        }

        decisions
    }

    /// Apply one decision to the campaign; failures are soft
    fn execute(
        &self,
        manager: &mut OverworldManager,
        faction: Faction,
        decision: &Decision,
    ) -> bool {
        let result = match decision.kind {
            DecisionKind::BuildStructure { coordinate, kind } => {
                manager.build_structure(coordinate, kind, faction)
            }
            DecisionKind::UpgradeBuilding { coordinate } => {
                manager.upgrade_building(coordinate, faction)
            }
            DecisionKind::MoveArmy { from, to }
            | DecisionKind::AttackTarget { from, target: to }
            | DecisionKind::ExpandTerritory { from, target: to } => {
                manager.move_army(from, to, faction).map(|_| ())
            }
            DecisionKind::DefendPosition { army, position } => {
                if army == position {
                    Ok(())
                } else {
                    manager.move_army(army, position, faction).map(|_| ())
                }
            }
        };

        match result {
            Ok(()) => true,
            Err(error) => {
                warn!(?faction, kind = ?decision.kind, %error, "ai decision failed");
                false
            }
        }
    }
}
