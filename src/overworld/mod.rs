//! The strategic turn loop: economy, construction, events, victory

pub mod effects;
pub mod events;

use std::path::Path;

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::building::BuildingType;
use crate::core::config::OverworldConfig;
use crate::core::error::{OverworldError, Result};
use crate::core::types::{Faction, Stockpile};
use crate::hex::HexCoord;
use crate::map::{Army, Building, OverworldMap};
use crate::movement::{self, MoveOrder, MoveOutcome};
use crate::terrain;

use effects::squad_bonuses;
use events::{ActiveEvent, EventLog, LogKind, StrategicEvent};

/// Ways a campaign can end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryCondition {
    /// Destroy every enemy settlement
    Conquest,
    /// Wipe out a faction's settlements and armies both
    Elimination,
    /// The player wins by lasting the given number of turns
    Survival { turns: u32 },
}

/// Serializable campaign state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverworldState {
    pub current_turn: u32,
    pub active_faction: Faction,
    pub map: OverworldMap,
    pub resources: AHashMap<Faction, Stockpile>,
    pub victory_conditions: Vec<VictoryCondition>,
    pub winner: Option<Faction>,
    pub game_ended: bool,
    pub active_events: Vec<ActiveEvent>,
    pub log: EventLog,
}

/// Owns the campaign state and drives the turn pipeline
pub struct OverworldManager {
    state: OverworldState,
    rng: ChaCha8Rng,
    config: OverworldConfig,
}

impl OverworldManager {
    pub fn new(config: OverworldConfig) -> Self {
        let map = OverworldMap::generate(&config);
        Self::with_map(config, map)
    }

    /// Build a manager around a prepared map
    pub fn with_map(config: OverworldConfig, map: OverworldMap) -> Self {
        let mut resources = AHashMap::new();
        resources.insert(Faction::Player, config.player_resources.to_stockpile());
        resources.insert(Faction::Enemy, config.enemy_resources.to_stockpile());

        let state = OverworldState {
            current_turn: 1,
            active_faction: Faction::Player,
            map,
            resources,
            victory_conditions: vec![VictoryCondition::Conquest],
            winner: None,
            game_ended: false,
            active_events: Vec::new(),
            log: EventLog::with_capacity(config.log_capacity),
        };

        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            state,
            config,
        }
    }

    pub fn state(&self) -> &OverworldState {
        &self.state
    }

    pub fn map(&self) -> &OverworldMap {
        &self.state.map
    }

    pub fn map_mut(&mut self) -> &mut OverworldMap {
        &mut self.state.map
    }

    pub fn config(&self) -> &OverworldConfig {
        &self.config
    }

    pub fn current_turn(&self) -> u32 {
        self.state.current_turn
    }

    pub fn active_faction(&self) -> Faction {
        self.state.active_faction
    }

    pub fn winner(&self) -> Option<Faction> {
        self.state.winner
    }

    pub fn log(&self) -> &EventLog {
        &self.state.log
    }

    pub fn set_victory_conditions(&mut self, conditions: Vec<VictoryCondition>) {
        self.state.victory_conditions = conditions;
    }

    pub fn resources(&self, faction: Faction) -> Result<&Stockpile> {
        self.state
            .resources
            .get(&faction)
            .ok_or(OverworldError::FactionNotInitialized(faction))
    }

    fn resources_mut(&mut self, faction: Faction) -> Result<&mut Stockpile> {
        self.state
            .resources
            .get_mut(&faction)
            .ok_or(OverworldError::FactionNotInitialized(faction))
    }

    /// Put an army on the map, movement budget set by its composition
    pub fn place_army(&mut self, coordinate: HexCoord, mut army: Army) -> Result<()> {
        let base = self.config.base_movement_points;
        let tile = self.state.map.tile_mut(coordinate)?;
        if tile.army.is_some() {
            return Err(OverworldError::TileOccupied(coordinate));
        }

        let budget = movement::army_movement_range(&army, base);
        army.movement_points = budget;
        army.max_movement_points = budget;
        tile.army = Some(army);
        Ok(())
    }

    pub fn remove_army(&mut self, coordinate: HexCoord) -> Result<Army> {
        self.state
            .map
            .tile_mut(coordinate)?
            .army
            .take()
            .ok_or(OverworldError::NoArmy(coordinate))
    }

    /// March a faction's army; battles are reported, not resolved
    pub fn move_army(
        &mut self,
        from: HexCoord,
        to: HexCoord,
        faction: Faction,
    ) -> Result<MoveOutcome> {
        let order = MoveOrder { from, to, faction };
        let outcome = movement::execute_move(&mut self.state.map, &order)?;

        let turn = self.state.current_turn;
        if let Some(battle) = &outcome.battle {
            self.state.log.record(
                turn,
                LogKind::BattleInitiated {
                    location: battle.location,
                    attacker: battle.attacker_faction,
                    defender: battle.defender_faction,
                },
            );
        } else {
            self.state.log.record(
                turn,
                LogKind::ArmyMoved {
                    faction,
                    from,
                    to: outcome.new_position,
                },
            );
        }
        Ok(outcome)
    }

    /// Start constructing a building on a controlled tile
    pub fn build_structure(
        &mut self,
        coordinate: HexCoord,
        kind: BuildingType,
        faction: Faction,
    ) -> Result<()> {
        let tile = self.state.map.tile(coordinate)?;
        if tile.controlled_by != faction {
            return Err(OverworldError::InvalidBuild(format!(
                "tile ({}, {}) is not controlled by {:?}",
                coordinate.q, coordinate.r, faction
            )));
        }
        if tile.building.is_some() {
            return Err(OverworldError::InvalidBuild(format!(
                "tile ({}, {}) already has a building",
                coordinate.q, coordinate.r
            )));
        }
        if !terrain::can_build_on(tile.terrain, kind) {
            return Err(OverworldError::InvalidBuild(format!(
                "{} cannot be built on {}",
                kind.name(),
                tile.terrain.name()
            )));
        }

        if !self.resources_mut(faction)?.spend(kind.build_cost()) {
            return Err(OverworldError::InsufficientResources(faction));
        }

        self.state.map.tile_mut(coordinate)?.building =
            Some(Building::under_construction(kind, faction));
        let turn = self.state.current_turn;
        self.state
            .log
            .record(turn, LogKind::ConstructionStarted { coordinate, kind });
        info!(?coordinate, kind = kind.name(), ?faction, "construction started");
        Ok(())
    }

    /// Upgrade a completed building one level
    pub fn upgrade_building(&mut self, coordinate: HexCoord, faction: Faction) -> Result<()> {
        let tile = self.state.map.tile(coordinate)?;
        let building = tile.building.as_ref().ok_or_else(|| {
            OverworldError::InvalidBuild(format!(
                "no building at ({}, {})",
                coordinate.q, coordinate.r
            ))
        })?;
        if building.faction != faction {
            return Err(OverworldError::InvalidBuild(format!(
                "building at ({}, {}) belongs to {:?}",
                coordinate.q, coordinate.r, building.faction
            )));
        }
        if !building.is_complete() {
            return Err(OverworldError::InvalidBuild(
                "building is still under construction".to_string(),
            ));
        }

        let kind = building.kind;
        let level = building.level;
        let cost = kind.upgrade_cost(level).ok_or_else(|| {
            OverworldError::InvalidBuild(format!("{} is already at maximum level", kind.name()))
        })?;

        if !self.resources_mut(faction)?.spend(cost) {
            return Err(OverworldError::InsufficientResources(faction));
        }

        let building = self
            .state
            .map
            .tile_mut(coordinate)?
            .building
            .as_mut()
            .ok_or(OverworldError::TileNotFound(coordinate))?;
        building.level += 1;
        let new_level = building.level;

        let turn = self.state.current_turn;
        self.state.log.record(
            turn,
            LogKind::BuildingUpgraded {
                coordinate,
                kind,
                level: new_level,
            },
        );
        info!(?coordinate, kind = kind.name(), level = new_level, "building upgraded");
        Ok(())
    }

    /// Advance the campaign one turn
    ///
    /// Pipeline order: economy, construction, auras, movement refresh,
    /// events, victory check, then the turn counter advances and the
    /// active faction rotates.
    pub fn end_turn(&mut self) {
        if self.state.game_ended {
            return;
        }

        self.generate_resources();
        self.process_construction();
        self.apply_building_auras();
        self.refresh_movement();
        self.process_events();
        self.check_victory();

        self.state.current_turn += 1;
        self.state.active_faction = match self.state.active_faction {
            Faction::Player => Faction::Enemy,
            _ => Faction::Player,
        };

        let turn = self.state.current_turn;
        let active = self.state.active_faction;
        self.state.log.record(turn, LogKind::TurnBegan { active });
        debug!(turn, ?active, "turn began");
    }

    /// Collect yields from completed buildings and controlled terrain
    fn generate_resources(&mut self) {
        let mut income: Vec<(Faction, crate::core::types::ResourceKind, u32)> = Vec::new();

        for tile in self.state.map.iter() {
            if let Some(building) = &tile.building {
                if building.is_complete() {
                    for (kind, amount) in building.kind.generation_at_level(building.level) {
                        income.push((building.faction, kind, amount));
                    }
                }
            }
            if tile.controlled_by != Faction::Neutral {
                for (kind, amount) in tile.terrain.resource_yield() {
                    income.push((tile.controlled_by, *kind, *amount));
                }
            }
        }

        for (faction, kind, amount) in income {
            if let Some(stockpile) = self.state.resources.get_mut(&faction) {
                stockpile.add(kind, amount);
            }
        }
    }

    /// Advance construction sites; each turn adds an equal share
    fn process_construction(&mut self) {
        let mut completed: Vec<(HexCoord, BuildingType)> = Vec::new();

        for tile in self.state.map.iter_mut() {
            let Some(building) = tile.building.as_mut() else {
                continue;
            };
            let Some(progress) = building.construction_progress.as_mut() else {
                continue;
            };

            *progress += 100.0 / building.kind.build_time() as f32;
            if *progress >= 100.0 {
                building.construction_progress = None;
                completed.push((tile.coordinate, building.kind));
            }
        }

        let turn = self.state.current_turn;
        for (coordinate, kind) in completed {
            self.state
                .log
                .record(turn, LogKind::ConstructionCompleted { coordinate, kind });
            info!(?coordinate, kind = kind.name(), "construction completed");
        }
    }

    /// Heal garrisoned armies from friendly auras in range
    fn apply_building_auras(&mut self) {
        let positions: Vec<(HexCoord, Faction)> = self
            .state
            .map
            .iter()
            .filter_map(|tile| {
                tile.army
                    .as_ref()
                    .map(|army| (tile.coordinate, army.faction))
            })
            .collect();

        for (coordinate, faction) in positions {
            let healing = squad_bonuses(&self.state.map, coordinate, faction).healing_per_turn;
            if healing <= 0 {
                continue;
            }
            if let Some(army) = self
                .state
                .map
                .get_mut(coordinate)
                .and_then(|tile| tile.army.as_mut())
            {
                for squad in &mut army.squads {
                    squad.heal(healing as f32);
                }
            }
        }
    }

    fn refresh_movement(&mut self) {
        for tile in self.state.map.iter_mut() {
            if let Some(army) = tile.army.as_mut() {
                army.movement_points = army.max_movement_points;
            }
        }
    }

    /// Age out finished events and maybe roll a new one
    fn process_events(&mut self) {
        let turn = self.state.current_turn;
        let mut ended: Vec<StrategicEvent> = Vec::new();

        self.state.active_events.retain_mut(|active| {
            active.turns_active += 1;
            if active.is_expired() {
                ended.push(active.event);
                false
            } else {
                true
            }
        });
        for event in ended {
            self.state.log.record(turn, LogKind::EventEnded { event });
        }

        if self.rng.gen_bool(self.config.event_chance) {
            let event = StrategicEvent::ALL[self.rng.gen_range(0..StrategicEvent::ALL.len())];
            let affected = self.state.active_faction;

            if let Some(stockpile) = self.state.resources.get_mut(&affected) {
                for (kind, delta) in event.resource_changes() {
                    stockpile.apply_delta(*kind, *delta);
                }
            }

            self.state
                .active_events
                .push(ActiveEvent::new(event, affected));
            self.state
                .log
                .record(turn, LogKind::EventFired { event, affected });
            info!(event = event.name(), ?affected, "strategic event fired");
        }
    }

    fn check_victory(&mut self) {
        if self.state.game_ended {
            return;
        }

        let conditions = self.state.victory_conditions.clone();
        for condition in conditions {
            let winner = match condition {
                VictoryCondition::Conquest => self.conquest_winner(),
                VictoryCondition::Elimination => self.elimination_winner(),
                VictoryCondition::Survival { turns } => {
                    if self.state.current_turn >= turns {
                        Some(Faction::Player)
                    } else {
                        None
                    }
                }
            };

            if let Some(winner) = winner {
                self.state.game_ended = true;
                self.state.winner = Some(winner);
                let turn = self.state.current_turn;
                self.state.log.record(turn, LogKind::GameWon { winner });
                info!(?winner, turn, "campaign won");
                return;
            }
        }
    }

    fn conquest_winner(&self) -> Option<Faction> {
        let player = self.state.map.settlement_count(Faction::Player);
        let enemy = self.state.map.settlement_count(Faction::Enemy);

        if enemy == 0 && player > 0 {
            Some(Faction::Player)
        } else if player == 0 && enemy > 0 {
            Some(Faction::Enemy)
        } else {
            None
        }
    }

    fn elimination_winner(&self) -> Option<Faction> {
        let wiped_out = |faction: Faction| {
            self.state.map.settlement_count(faction) == 0
                && self.state.map.armies_of(faction).next().is_none()
        };

        if wiped_out(Faction::Enemy) {
            Some(Faction::Player)
        } else if wiped_out(Faction::Player) {
            Some(Faction::Enemy)
        } else {
            None
        }
    }

    /// Write the campaign state to disk as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Restore a campaign saved with [`save`](Self::save)
    ///
    /// The RNG restarts from the configured seed.
    pub fn load(path: impl AsRef<Path>, config: OverworldConfig) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let state: OverworldState = serde_json::from_str(&json)?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            state,
            config,
        })
    }
}
