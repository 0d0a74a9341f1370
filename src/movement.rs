//! Army movement execution and strategic movement analysis

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::building::BuildingType;
use crate::core::error::{OverworldError, Result};
use crate::core::types::{Faction, Squad};
use crate::hex::HexCoord;
use crate::map::{Army, OverworldMap};
use crate::pathfinding::{self, PathfindOptions};
use crate::terrain::TerrainType;

/// An order to march the army at `from` toward `to`
#[derive(Debug, Clone, Copy)]
pub struct MoveOrder {
    pub from: HexCoord,
    pub to: HexCoord,
    pub faction: Faction,
}

/// Everything a battle resolver needs about an engagement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleContext {
    pub location: HexCoord,
    pub attacker_faction: Faction,
    pub attacker_squads: Vec<Squad>,
    pub defender_faction: Faction,
    pub defender_squads: Vec<Squad>,
    pub terrain: TerrainType,
    pub building: Option<BuildingType>,
    pub siege: bool,
}

/// Result of executing a move order
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub new_position: HexCoord,
    pub remaining_movement: f32,
    /// Set when the march ran into a hostile army
    pub battle: Option<BattleContext>,
    /// True when the army stopped short of the ordered destination
    pub partial: bool,
}

/// March an army along the best route toward its destination
///
/// A full march that ends on a hostile army does not displace it;
/// the attacker holds position and a [`BattleContext`] is returned
/// for the battle layer to resolve. Entering a neutral tile claims
/// it. When movement points run out mid-route the army advances as
/// far as it can afford, stopping short of any hostile army.
pub fn execute_move(map: &mut OverworldMap, order: &MoveOrder) -> Result<MoveOutcome> {
    map.tile(order.to)?;
    let from_tile = map.tile(order.from)?;
    let army = from_tile.army.as_ref().ok_or(OverworldError::NoArmy(order.from))?;
    if army.faction != order.faction {
        return Err(OverworldError::NotOwnArmy(order.from, order.faction));
    }

    let movement_points = army.movement_points;
    let attacker_squads = army.squads.clone();
    let skills = army.movement_skills.clone();
    let options =
        PathfindOptions::for_faction(order.faction).with_skills(skills.clone());

    let path = pathfinding::find_path(map, order.from, order.to, &options)
        .ok_or(OverworldError::NoPath(order.to))?;

    if path.total_cost > movement_points {
        return execute_partial(map, order, &path.tiles, movement_points);
    }

    let destination = map.tile(order.to)?;
    // Any foreign army forces an engagement; an army never vanishes
    // under another faction's march, allied or not
    if let Some(defender) = destination
        .army
        .as_ref()
        .filter(|army| army.faction != order.faction)
    {
        let context = BattleContext {
            location: order.to,
            attacker_faction: order.faction,
            attacker_squads,
            defender_faction: defender.faction,
            defender_squads: defender.squads.clone(),
            terrain: destination.terrain,
            building: destination.building.as_ref().map(|b| b.kind),
            siege: destination.building.is_some(),
        };

        // The attacker holds its tile; the battle layer decides who
        // ends up where
        let remaining = movement_points - path.total_cost;
        if let Some(army) = map.tile_mut(order.from)?.army.as_mut() {
            army.movement_points = remaining;
        }

        debug!(
            from = ?order.from,
            to = ?order.to,
            faction = ?order.faction,
            siege = context.siege,
            "march engaged foreign army"
        );
        return Ok(MoveOutcome {
            new_position: order.from,
            remaining_movement: remaining,
            battle: Some(context),
            partial: false,
        });
    }

    let remaining = movement_points - path.total_cost;
    relocate_army(map, order.from, order.to, remaining)?;
    debug!(from = ?order.from, to = ?order.to, faction = ?order.faction, "army moved");

    Ok(MoveOutcome {
        new_position: order.to,
        remaining_movement: remaining,
        battle: None,
        partial: false,
    })
}

/// Walk the route until movement runs out or a foreign army blocks it
fn execute_partial(
    map: &mut OverworldMap,
    order: &MoveOrder,
    route: &[HexCoord],
    movement_points: f32,
) -> Result<MoveOutcome> {
    let skills = map
        .tile(order.from)?
        .army
        .as_ref()
        .map(|army| army.movement_skills.clone())
        .unwrap_or_default();

    let mut position = order.from;
    let mut remaining = movement_points;

    for step in route.iter().skip(1) {
        let Some(tile) = map.get(*step) else {
            break;
        };
        let cost = tile.terrain.step_cost(&skills);
        if cost > remaining {
            break;
        }
        if tile.has_foreign_army(order.faction) {
            break;
        }
        position = *step;
        remaining -= cost;
    }

    if position == order.from {
        return Err(OverworldError::NoMovementProgress);
    }

    relocate_army(map, order.from, position, remaining)?;
    debug!(
        from = ?order.from,
        reached = ?position,
        ordered = ?order.to,
        "army advanced partially"
    );

    Ok(MoveOutcome {
        new_position: position,
        remaining_movement: remaining,
        battle: None,
        partial: true,
    })
}

fn relocate_army(
    map: &mut OverworldMap,
    from: HexCoord,
    to: HexCoord,
    remaining: f32,
) -> Result<()> {
    let mut army = map
        .tile_mut(from)?
        .army
        .take()
        .ok_or(OverworldError::NoArmy(from))?;
    army.movement_points = remaining;
    let faction = army.faction;

    let destination = map.tile_mut(to)?;
    destination.army = Some(army);
    if destination.controlled_by == Faction::Neutral {
        destination.controlled_by = faction;
    }
    Ok(())
}

/// Movement point budget for an army, from its composition
///
/// Base movement shifts up for cavalry-heavy forces and down for
/// heavy ones, never below one point.
pub fn army_movement_range(army: &Army, base_movement: f32) -> f32 {
    if army.squads.is_empty() {
        return 0.0;
    }

    let mut movement = base_movement;

    let cavalry = army.class_fraction(|unit| unit.is_cavalry_class());
    if cavalry >= 0.5 {
        movement += 2.0;
    } else if cavalry >= 0.25 {
        movement += 1.0;
    }

    let heavy = army.class_fraction(|unit| unit.is_heavy_class());
    if heavy >= 0.5 {
        movement -= 1.0;
    }

    movement.max(1.0)
}

/// A reachable destination with its strategic weight
#[derive(Debug, Clone)]
pub struct Destination {
    pub coordinate: HexCoord,
    pub movement_cost: f32,
    /// A hostile army waits on the tile
    pub can_engage: bool,
    pub tactical_value: i32,
}

/// All destinations reachable this turn, highest value first
pub fn valid_destinations(
    map: &OverworldMap,
    position: HexCoord,
    movement_points: f32,
    faction: Faction,
    skills: &[crate::terrain::MovementSkill],
) -> Vec<Destination> {
    let options = PathfindOptions::for_faction(faction).with_skills(skills.to_vec());
    let reachable = pathfinding::reachable_tiles(map, position, movement_points, &options);

    let mut destinations: Vec<Destination> = reachable
        .into_iter()
        .filter_map(|(coordinate, cost)| {
            let tile = map.get(coordinate)?;
            let can_engage = tile.has_hostile_army(faction);

            let mut tactical_value = 0;
            if tile.building.is_some() {
                tactical_value += 30;
            }
            if tile.controlled_by == Faction::Neutral {
                tactical_value += 10;
            } else if tile.controlled_by != faction {
                tactical_value += 20;
            }
            if tile.terrain.is_high_ground() {
                tactical_value += 15;
            }
            if can_engage {
                tactical_value += 50;
            }

            Some(Destination {
                coordinate,
                movement_cost: cost,
                can_engage,
                tactical_value,
            })
        })
        .collect();

    destinations.sort_by_key(|destination| Reverse(destination.tactical_value));
    destinations
}

/// What a planned leg expects to accomplish on arrival
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegAction {
    CaptureNeutralTerritory,
    CaptureBuilding(BuildingType),
    EngageEnemyArmy,
    Blocked,
}

/// One turn of a multi-turn march plan
#[derive(Debug, Clone)]
pub struct PlannedLeg {
    pub turn: u32,
    pub position: HexCoord,
    pub movement_cost: f32,
    pub actions: Vec<LegAction>,
}

/// Sketch a turn-by-turn march toward a distant goal
///
/// Each leg greedily picks the reachable tile closest to the goal,
/// avoiding enemy-held tiles. Planning stops at the goal, at
/// `max_turns`, or when no leg makes progress.
pub fn plan_multi_turn(
    map: &OverworldMap,
    start: HexCoord,
    goal: HexCoord,
    movement_per_turn: f32,
    faction: Faction,
    max_turns: u32,
) -> Vec<PlannedLeg> {
    let options = PathfindOptions::for_faction(faction).avoiding_enemies();
    let mut plan: Vec<PlannedLeg> = Vec::new();
    let mut position = start;

    for turn in 1..=max_turns {
        if position == goal {
            break;
        }

        let reachable = pathfinding::reachable_tiles(map, position, movement_per_turn, &options);
        let best = reachable
            .iter()
            .min_by_key(|(coordinate, _)| coordinate.distance(goal));

        let Some((next, cost)) = best else {
            plan.push(PlannedLeg {
                turn,
                position,
                movement_cost: 0.0,
                actions: vec![LegAction::Blocked],
            });
            break;
        };

        // No tile brings us closer; further legs would tread water
        if next.distance(goal) >= position.distance(goal) {
            plan.push(PlannedLeg {
                turn,
                position,
                movement_cost: 0.0,
                actions: vec![LegAction::Blocked],
            });
            break;
        }

        let mut actions: Vec<LegAction> = Vec::new();
        if let Some(tile) = map.get(*next) {
            if tile.controlled_by == Faction::Neutral {
                actions.push(LegAction::CaptureNeutralTerritory);
            }
            if let Some(building) = &tile.building {
                if building.faction != faction {
                    actions.push(LegAction::CaptureBuilding(building.kind));
                }
            }
            if tile.has_hostile_army(faction) {
                actions.push(LegAction::EngageEnemyArmy);
            }
        }

        plan.push(PlannedLeg {
            turn,
            position: *next,
            movement_cost: *cost,
            actions,
        });
        position = *next;
    }

    plan
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffensiveReason {
    EnemyArmy,
    EnemyBuilding(BuildingType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefensiveReason {
    HighGround,
    FriendlyFortification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EconomicReason {
    UnclaimedTerritory,
    ResourceBuilding(BuildingType),
}

/// A scored movement target with the rationale attached
#[derive(Debug, Clone)]
pub struct RatedTarget<R> {
    pub coordinate: HexCoord,
    pub score: f32,
    pub reason: R,
}

/// Reachable targets bucketed by strategic role
#[derive(Debug, Clone, Default)]
pub struct StrategicOptions {
    pub offensive: Vec<RatedTarget<OffensiveReason>>,
    pub defensive: Vec<RatedTarget<DefensiveReason>>,
    pub economic: Vec<RatedTarget<EconomicReason>>,
}

/// Bucket every reachable tile into offensive, defensive, and
/// economic targets, each bucket sorted best first
pub fn strategic_options(
    map: &OverworldMap,
    position: HexCoord,
    movement_points: f32,
    faction: Faction,
    skills: &[crate::terrain::MovementSkill],
) -> StrategicOptions {
    let destinations = valid_destinations(map, position, movement_points, faction, skills);
    let mut options = StrategicOptions::default();

    for destination in &destinations {
        let Some(tile) = map.get(destination.coordinate) else {
            continue;
        };

        if destination.can_engage {
            options.offensive.push(RatedTarget {
                coordinate: destination.coordinate,
                score: 100.0 - destination.movement_cost,
                reason: OffensiveReason::EnemyArmy,
            });
        }
        if let Some(building) = &tile.building {
            if building.faction != faction {
                options.offensive.push(RatedTarget {
                    coordinate: destination.coordinate,
                    score: 80.0 - destination.movement_cost,
                    reason: OffensiveReason::EnemyBuilding(building.kind),
                });
            }
        }

        if tile.terrain.is_high_ground() {
            options.defensive.push(RatedTarget {
                coordinate: destination.coordinate,
                score: 70.0,
                reason: DefensiveReason::HighGround,
            });
        }
        if let Some(building) = &tile.building {
            if building.faction == faction {
                options.defensive.push(RatedTarget {
                    coordinate: destination.coordinate,
                    score: 60.0,
                    reason: DefensiveReason::FriendlyFortification,
                });
            }
        }

        if tile.controlled_by == Faction::Neutral {
            options.economic.push(RatedTarget {
                coordinate: destination.coordinate,
                score: 40.0,
                reason: EconomicReason::UnclaimedTerritory,
            });
        }
        if let Some(building) = &tile.building {
            if matches!(building.kind, BuildingType::Mine | BuildingType::Farm) {
                options.economic.push(RatedTarget {
                    coordinate: destination.coordinate,
                    score: 50.0,
                    reason: EconomicReason::ResourceBuilding(building.kind),
                });
            }
        }
    }

    options.offensive.sort_by_key(|t| Reverse(OrderedFloat(t.score)));
    options.defensive.sort_by_key(|t| Reverse(OrderedFloat(t.score)));
    options.economic.sort_by_key(|t| Reverse(OrderedFloat(t.score)));
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitClass;
    use crate::map::{Building, MapTile};

    fn flat_map(width: i32, height: i32) -> OverworldMap {
        let mut map = OverworldMap::empty(width, height);
        for row in 0..height {
            for col in 0..width {
                map.insert(MapTile::new(
                    HexCoord::from_offset(col, row),
                    TerrainType::Plains,
                ));
            }
        }
        map
    }

    fn infantry_army(faction: Faction, movement: f32) -> Army {
        Army::new(
            faction,
            vec![Squad::new(
                "Spears",
                vec![UnitClass::Infantry, UnitClass::Infantry],
                60.0,
            )],
            movement,
        )
    }

    #[test]
    fn test_full_move_claims_neutral_tile() {
        let mut map = flat_map(5, 1);
        let start = HexCoord::from_offset(0, 0);
        let goal = HexCoord::from_offset(2, 0);
        map.get_mut(start).unwrap().army = Some(infantry_army(Faction::Player, 3.0));

        let outcome = execute_move(
            &mut map,
            &MoveOrder {
                from: start,
                to: goal,
                faction: Faction::Player,
            },
        )
        .unwrap();

        assert_eq!(outcome.new_position, goal);
        assert_eq!(outcome.remaining_movement, 1.0);
        assert!(!outcome.partial);
        assert!(map.get(start).unwrap().army.is_none());
        assert_eq!(map.get(goal).unwrap().controlled_by, Faction::Player);
    }

    #[test]
    fn test_partial_move_stops_when_points_run_out() {
        let mut map = flat_map(8, 1);
        let start = HexCoord::from_offset(0, 0);
        let goal = HexCoord::from_offset(6, 0);
        map.get_mut(start).unwrap().army = Some(infantry_army(Faction::Player, 3.0));

        let outcome = execute_move(
            &mut map,
            &MoveOrder {
                from: start,
                to: goal,
                faction: Faction::Player,
            },
        )
        .unwrap();

        assert!(outcome.partial);
        assert_eq!(outcome.new_position, HexCoord::from_offset(3, 0));
        assert_eq!(outcome.remaining_movement, 0.0);
    }

    #[test]
    fn test_move_onto_enemy_triggers_battle_without_displacement() {
        let mut map = flat_map(3, 1);
        let start = HexCoord::from_offset(0, 0);
        let target = HexCoord::from_offset(1, 0);
        map.get_mut(start).unwrap().army = Some(infantry_army(Faction::Player, 3.0));
        map.get_mut(target).unwrap().army = Some(infantry_army(Faction::Enemy, 3.0));
        map.get_mut(target).unwrap().building =
            Some(Building::completed(BuildingType::Outpost, 1, Faction::Enemy));

        let outcome = execute_move(
            &mut map,
            &MoveOrder {
                from: start,
                to: target,
                faction: Faction::Player,
            },
        )
        .unwrap();

        let battle = outcome.battle.unwrap();
        assert_eq!(battle.location, target);
        assert_eq!(battle.defender_faction, Faction::Enemy);
        assert!(battle.siege);
        // Attacker keeps its tile until the battle resolves
        assert_eq!(outcome.new_position, start);
        assert!(map.get(start).unwrap().army.is_some());
        assert!(map.get(target).unwrap().army.is_some());
    }

    #[test]
    fn test_move_onto_allied_army_engages_without_overrun() {
        let mut map = flat_map(3, 1);
        let start = HexCoord::from_offset(0, 0);
        let target = HexCoord::from_offset(1, 0);
        map.get_mut(start).unwrap().army = Some(infantry_army(Faction::Player, 3.0));
        map.get_mut(target).unwrap().army = Some(infantry_army(Faction::Allied, 3.0));

        let outcome = execute_move(
            &mut map,
            &MoveOrder {
                from: start,
                to: target,
                faction: Faction::Player,
            },
        )
        .unwrap();

        // Allied or not, a foreign army is never silently replaced
        assert!(outcome.battle.is_some());
        assert_eq!(outcome.new_position, start);
        assert_eq!(
            map.get(target).unwrap().army.as_ref().unwrap().faction,
            Faction::Allied
        );
        assert_eq!(
            map.get(start).unwrap().army.as_ref().unwrap().faction,
            Faction::Player
        );
    }

    #[test]
    fn test_partial_move_halts_before_allied_army() {
        let mut map = flat_map(8, 1);
        let start = HexCoord::from_offset(0, 0);
        let blocker = HexCoord::from_offset(2, 0);
        map.get_mut(start).unwrap().army = Some(infantry_army(Faction::Player, 3.0));
        map.get_mut(blocker).unwrap().army = Some(infantry_army(Faction::Allied, 3.0));

        let outcome = execute_move(
            &mut map,
            &MoveOrder {
                from: start,
                to: HexCoord::from_offset(6, 0),
                faction: Faction::Player,
            },
        )
        .unwrap();

        assert!(outcome.partial);
        assert_eq!(outcome.new_position, HexCoord::from_offset(1, 0));
        assert_eq!(
            map.get(blocker).unwrap().army.as_ref().unwrap().faction,
            Faction::Allied
        );
    }

    #[test]
    fn test_cannot_order_another_factions_army() {
        let mut map = flat_map(3, 1);
        let start = HexCoord::from_offset(0, 0);
        map.get_mut(start).unwrap().army = Some(infantry_army(Faction::Enemy, 3.0));

        let result = execute_move(
            &mut map,
            &MoveOrder {
                from: start,
                to: HexCoord::from_offset(1, 0),
                faction: Faction::Player,
            },
        );
        assert!(matches!(result, Err(OverworldError::NotOwnArmy(_, _))));
    }

    #[test]
    fn test_no_progress_is_an_error() {
        let mut map = flat_map(3, 3);
        let start = HexCoord::from_offset(1, 1);
        let mut army = infantry_army(Faction::Player, 3.0);
        army.movement_points = 0.5;
        map.get_mut(start).unwrap().army = Some(army);

        let result = execute_move(
            &mut map,
            &MoveOrder {
                from: start,
                to: HexCoord::from_offset(1, 0),
                faction: Faction::Player,
            },
        );
        assert!(matches!(result, Err(OverworldError::NoMovementProgress)));
    }

    #[test]
    fn test_movement_range_composition() {
        let base = 3.0;

        let infantry = infantry_army(Faction::Player, base);
        assert_eq!(army_movement_range(&infantry, base), 3.0);

        let riders = Army::new(
            Faction::Player,
            vec![Squad::new(
                "Riders",
                vec![UnitClass::Cavalry, UnitClass::Cavalry],
                60.0,
            )],
            base,
        );
        // Cavalry is both fast and heavy: +2 and -1
        assert_eq!(army_movement_range(&riders, base), 4.0);

        let mixed = Army::new(
            Faction::Player,
            vec![Squad::new(
                "Column",
                vec![
                    UnitClass::Cavalry,
                    UnitClass::Infantry,
                    UnitClass::Infantry,
                    UnitClass::Archer,
                ],
                80.0,
            )],
            base,
        );
        assert_eq!(army_movement_range(&mixed, base), 4.0);

        let heavies = Army::new(
            Faction::Player,
            vec![Squad::new(
                "Shields",
                vec![UnitClass::HeavyInfantry, UnitClass::HeavyInfantry],
                70.0,
            )],
            base,
        );
        assert_eq!(army_movement_range(&heavies, base), 2.0);

        let empty = Army::new(Faction::Player, Vec::new(), base);
        assert_eq!(army_movement_range(&empty, base), 0.0);
    }

    #[test]
    fn test_valid_destinations_rank_engagements_first() {
        let mut map = flat_map(5, 5);
        let position = HexCoord::from_offset(2, 2);
        let enemy = HexCoord::from_offset(3, 2);
        map.get_mut(enemy).unwrap().army = Some(infantry_army(Faction::Enemy, 3.0));

        let destinations = valid_destinations(&map, position, 2.0, Faction::Player, &[]);
        assert_eq!(destinations[0].coordinate, enemy);
        assert!(destinations[0].can_engage);
        // Engagement +50, neutral territory +10
        assert_eq!(destinations[0].tactical_value, 60);
    }

    #[test]
    fn test_plan_multi_turn_reaches_goal() {
        let map = flat_map(10, 1);
        let start = HexCoord::from_offset(0, 0);
        let goal = HexCoord::from_offset(8, 0);

        let plan = plan_multi_turn(&map, start, goal, 3.0, Faction::Player, 10);
        assert!(!plan.is_empty());
        assert!(plan.len() <= 3);
        assert_eq!(plan.last().unwrap().position, goal);
        assert!(plan
            .iter()
            .all(|leg| leg.actions.contains(&LegAction::CaptureNeutralTerritory)));
    }

    #[test]
    fn test_strategic_options_bucketed_and_sorted() {
        let mut map = flat_map(5, 5);
        let position = HexCoord::from_offset(2, 2);

        let enemy_army = HexCoord::from_offset(3, 2);
        map.get_mut(enemy_army).unwrap().army = Some(infantry_army(Faction::Enemy, 3.0));

        let farm = HexCoord::from_offset(1, 2);
        map.get_mut(farm).unwrap().building =
            Some(Building::completed(BuildingType::Farm, 1, Faction::Enemy));

        let hill = HexCoord::from_offset(2, 1);
        map.get_mut(hill).unwrap().terrain = TerrainType::Hills;

        let options = strategic_options(&map, position, 3.0, Faction::Player, &[]);

        assert_eq!(options.offensive[0].reason, OffensiveReason::EnemyArmy);
        assert!(options
            .offensive
            .iter()
            .any(|t| t.reason == OffensiveReason::EnemyBuilding(BuildingType::Farm)));
        assert!(options
            .defensive
            .iter()
            .any(|t| t.coordinate == hill && t.reason == DefensiveReason::HighGround));
        assert!(options
            .economic
            .iter()
            .any(|t| t.reason == EconomicReason::ResourceBuilding(BuildingType::Farm)));
        assert!(options
            .offensive
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }
}
