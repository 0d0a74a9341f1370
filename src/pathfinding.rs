//! A* pathfinding and reachability over the hex map

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;

use crate::core::types::Faction;
use crate::hex::HexCoord;
use crate::map::{MapTile, OverworldMap};
use crate::terrain::MovementSkill;

/// Constraints applied to a pathfinding query
#[derive(Debug, Clone)]
pub struct PathfindOptions {
    pub faction: Faction,
    /// Abandon routes whose cost exceeds this budget
    pub max_cost: Option<f32>,
    /// Treat tiles holding another faction's army as blocked
    pub avoid_enemies: bool,
    pub movement_skills: Vec<MovementSkill>,
}

impl PathfindOptions {
    pub fn for_faction(faction: Faction) -> Self {
        Self {
            faction,
            max_cost: None,
            avoid_enemies: false,
            movement_skills: Vec::new(),
        }
    }

    pub fn avoiding_enemies(mut self) -> Self {
        self.avoid_enemies = true;
        self
    }

    pub fn with_max_cost(mut self, max_cost: f32) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    pub fn with_skills(mut self, skills: Vec<MovementSkill>) -> Self {
        self.movement_skills = skills;
        self
    }
}

/// A found route, start tile included
#[derive(Debug, Clone, PartialEq)]
pub struct MovementPath {
    pub tiles: Vec<HexCoord>,
    pub total_cost: f32,
}

impl MovementPath {
    pub fn destination(&self) -> Option<HexCoord> {
        self.tiles.last().copied()
    }

    pub fn step_count(&self) -> usize {
        self.tiles.len().saturating_sub(1)
    }
}

/// Cost to enter a tile under the given options, or None if blocked
fn entry_cost(tile: &MapTile, options: &PathfindOptions) -> Option<f32> {
    if !tile.terrain.passable_for(&options.movement_skills) {
        return None;
    }
    if options.avoid_enemies {
        if let Some(army) = &tile.army {
            if army.faction != options.faction {
                return None;
            }
        }
    }
    Some(tile.terrain.step_cost(&options.movement_skills))
}

#[derive(PartialEq, Eq)]
struct Node {
    estimate: OrderedFloat<f32>,
    cost: OrderedFloat<f32>,
    coordinate: HexCoord,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.estimate
            .cmp(&other.estimate)
            .then(self.cost.cmp(&other.cost))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A* route from `start` to `goal`, or None when unreachable
pub fn find_path(
    map: &OverworldMap,
    start: HexCoord,
    goal: HexCoord,
    options: &PathfindOptions,
) -> Option<MovementPath> {
    if !map.contains(start) || !map.contains(goal) {
        return None;
    }

    let mut open: BinaryHeap<Reverse<Node>> = BinaryHeap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut best_cost: AHashMap<HexCoord, f32> = AHashMap::new();

    best_cost.insert(start, 0.0);
    open.push(Reverse(Node {
        estimate: OrderedFloat(start.distance(goal) as f32),
        cost: OrderedFloat(0.0),
        coordinate: start,
    }));

    while let Some(Reverse(node)) = open.pop() {
        let current = node.coordinate;
        let current_cost = node.cost.0;

        if current == goal {
            return Some(reconstruct(map, &came_from, goal, options));
        }
        if current_cost > best_cost.get(&current).copied().unwrap_or(f32::INFINITY) {
            continue;
        }

        for neighbor in current.neighbors() {
            let Some(tile) = map.get(neighbor) else {
                continue;
            };
            let Some(step) = entry_cost(tile, options) else {
                continue;
            };

            let tentative = current_cost + step;
            if let Some(budget) = options.max_cost {
                if tentative > budget {
                    continue;
                }
            }
            if tentative >= best_cost.get(&neighbor).copied().unwrap_or(f32::INFINITY) {
                continue;
            }

            came_from.insert(neighbor, current);
            best_cost.insert(neighbor, tentative);
            open.push(Reverse(Node {
                estimate: OrderedFloat(tentative + neighbor.distance(goal) as f32),
                cost: OrderedFloat(tentative),
                coordinate: neighbor,
            }));
        }
    }

    None
}

fn reconstruct(
    map: &OverworldMap,
    came_from: &AHashMap<HexCoord, HexCoord>,
    goal: HexCoord,
    options: &PathfindOptions,
) -> MovementPath {
    let mut tiles = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from.get(&current) {
        tiles.push(*previous);
        current = *previous;
    }
    tiles.reverse();

    let total_cost = path_cost(map, &tiles, &options.movement_skills);
    MovementPath { tiles, total_cost }
}

/// Every tile reachable within a movement budget, cheapest first
///
/// The start tile itself is excluded from the result.
pub fn reachable_tiles(
    map: &OverworldMap,
    start: HexCoord,
    max_movement: f32,
    options: &PathfindOptions,
) -> Vec<(HexCoord, f32)> {
    let mut open: BinaryHeap<Reverse<Node>> = BinaryHeap::new();
    let mut best_cost: AHashMap<HexCoord, f32> = AHashMap::new();

    best_cost.insert(start, 0.0);
    open.push(Reverse(Node {
        estimate: OrderedFloat(0.0),
        cost: OrderedFloat(0.0),
        coordinate: start,
    }));

    while let Some(Reverse(node)) = open.pop() {
        let current = node.coordinate;
        let current_cost = node.cost.0;
        if current_cost > best_cost.get(&current).copied().unwrap_or(f32::INFINITY) {
            continue;
        }
        if current_cost >= max_movement {
            continue;
        }

        for neighbor in current.neighbors() {
            let Some(tile) = map.get(neighbor) else {
                continue;
            };
            let Some(step) = entry_cost(tile, options) else {
                continue;
            };

            let tentative = current_cost + step;
            if tentative > max_movement {
                continue;
            }
            if tentative >= best_cost.get(&neighbor).copied().unwrap_or(f32::INFINITY) {
                continue;
            }

            best_cost.insert(neighbor, tentative);
            open.push(Reverse(Node {
                estimate: OrderedFloat(tentative),
                cost: OrderedFloat(tentative),
                coordinate: neighbor,
            }));
        }
    }

    let mut reachable: Vec<(HexCoord, f32)> = best_cost
        .into_iter()
        .filter(|(coordinate, _)| *coordinate != start)
        .collect();
    reachable.sort_by_key(|(coordinate, cost)| {
        (OrderedFloat(*cost), coordinate.r, coordinate.q)
    });
    reachable
}

/// Cost of an explicit route; the first tile is free
pub fn path_cost(map: &OverworldMap, path: &[HexCoord], skills: &[MovementSkill]) -> f32 {
    path.iter()
        .skip(1)
        .filter_map(|coordinate| map.get(*coordinate))
        .map(|tile| tile.terrain.step_cost(skills))
        .sum()
}

/// Chain A* segments through a list of waypoints
pub fn multi_waypoint_path(
    map: &OverworldMap,
    waypoints: &[HexCoord],
    options: &PathfindOptions,
) -> Option<MovementPath> {
    match waypoints {
        [] => None,
        [only] => Some(MovementPath {
            tiles: vec![*only],
            total_cost: 0.0,
        }),
        _ => {
            let mut tiles: Vec<HexCoord> = Vec::new();
            let mut total_cost = 0.0;

            for pair in waypoints.windows(2) {
                let segment = find_path(map, pair[0], pair[1], options)?;
                if tiles.is_empty() {
                    tiles.extend(segment.tiles.iter());
                } else {
                    tiles.extend(segment.tiles.iter().skip(1));
                }
                total_cost += segment.total_cost;
            }

            Some(MovementPath { tiles, total_cost })
        }
    }
}

/// A candidate position adjacent to an assault target
#[derive(Debug, Clone)]
pub struct TacticalPosition {
    pub coordinate: HexCoord,
    pub tactical_value: i32,
    pub can_reach: bool,
    pub movement_cost: f32,
}

/// Score the tiles surrounding a target for an assault
///
/// High ground and forest cover score up, enemy-held ground scores
/// down, standing structures are worth taking. Best positions first.
pub fn tactical_positions(
    map: &OverworldMap,
    target: HexCoord,
    options: &PathfindOptions,
) -> Vec<TacticalPosition> {
    let mut positions: Vec<TacticalPosition> = Vec::new();

    for neighbor in target.neighbors() {
        let Some(tile) = map.get(neighbor) else {
            continue;
        };

        let mut tactical_value = 0;
        if tile.terrain.is_high_ground() {
            tactical_value += 20;
        }
        if tile.terrain == crate::terrain::TerrainType::Forest {
            tactical_value += 15;
        }
        if tile.building.is_some() {
            tactical_value += 25;
        }
        if tile.controlled_by != options.faction && tile.controlled_by != Faction::Neutral {
            tactical_value -= 30;
        }

        let entry = entry_cost(tile, options);
        positions.push(TacticalPosition {
            coordinate: neighbor,
            tactical_value,
            can_reach: entry.is_some(),
            movement_cost: entry.unwrap_or(0.0),
        });
    }

    positions.sort_by_key(|position| Reverse(position.tactical_value));
    positions
}

/// Tiles an army can reach or strike next turn
pub fn zone_of_control(
    map: &OverworldMap,
    position: HexCoord,
    movement_range: f32,
    faction: Faction,
) -> AHashSet<HexCoord> {
    let options = PathfindOptions::for_faction(faction);
    let mut zone: AHashSet<HexCoord> = AHashSet::new();

    for (coordinate, _) in reachable_tiles(map, position, movement_range, &options) {
        zone.insert(coordinate);
        for neighbor in coordinate.neighbors() {
            if map.contains(neighbor) {
                zone.insert(neighbor);
            }
        }
    }

    zone
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Squad, UnitClass};
    use crate::map::{Army, MapTile};
    use crate::terrain::TerrainType;

    fn flat_map(width: i32, height: i32) -> OverworldMap {
        let mut map = OverworldMap::empty(width, height);
        for row in 0..height {
            for col in 0..width {
                let coordinate = HexCoord::from_offset(col, row);
                map.insert(MapTile::new(coordinate, TerrainType::Plains));
            }
        }
        map
    }

    fn set_terrain(map: &mut OverworldMap, col: i32, row: i32, terrain: TerrainType) {
        map.get_mut(HexCoord::from_offset(col, row)).unwrap().terrain = terrain;
    }

    fn militia(faction: Faction) -> Army {
        Army::new(
            faction,
            vec![Squad::new("Militia", vec![UnitClass::Infantry], 50.0)],
            3.0,
        )
    }

    #[test]
    fn test_straight_path_on_plains() {
        let map = flat_map(6, 1);
        let options = PathfindOptions::for_faction(Faction::Player);
        let start = HexCoord::from_offset(0, 0);
        let goal = HexCoord::from_offset(4, 0);

        let path = find_path(&map, start, goal, &options).unwrap();
        assert_eq!(path.tiles.first(), Some(&start));
        assert_eq!(path.destination(), Some(goal));
        assert_eq!(path.step_count(), 4);
        assert_eq!(path.total_cost, 4.0);
    }

    #[test]
    fn test_path_detours_around_expensive_terrain() {
        let mut map = flat_map(5, 3);
        // Wall of rivers across the middle row except the last column
        for col in 0..4 {
            set_terrain(&mut map, col, 1, TerrainType::River);
        }

        let options = PathfindOptions::for_faction(Faction::Player);
        let start = HexCoord::from_offset(0, 0);
        let goal = HexCoord::from_offset(0, 2);

        let path = find_path(&map, start, goal, &options).unwrap();
        // Rivers are impassable without water walking, so the path
        // must thread through the open column
        assert!(path
            .tiles
            .iter()
            .all(|c| map.get(*c).unwrap().terrain != TerrainType::River));
    }

    #[test]
    fn test_skill_opens_gated_terrain() {
        let mut map = flat_map(3, 3);
        for col in 0..3 {
            set_terrain(&mut map, col, 1, TerrainType::River);
        }

        let start = HexCoord::from_offset(1, 0);
        let goal = HexCoord::from_offset(1, 2);

        let blocked = PathfindOptions::for_faction(Faction::Player);
        assert!(find_path(&map, start, goal, &blocked).is_none());

        let swimming = PathfindOptions::for_faction(Faction::Player)
            .with_skills(vec![MovementSkill::WaterWalking]);
        let path = find_path(&map, start, goal, &swimming).unwrap();
        // Satisfied requirement normalizes the river step to 1.0
        assert_eq!(path.total_cost, 2.0);
    }

    #[test]
    fn test_avoid_enemies_blocks_occupied_tiles() {
        let mut map = flat_map(3, 1);
        map.get_mut(HexCoord::from_offset(1, 0)).unwrap().army = Some(militia(Faction::Enemy));

        let start = HexCoord::from_offset(0, 0);
        let goal = HexCoord::from_offset(2, 0);

        let careless = PathfindOptions::for_faction(Faction::Player);
        assert!(find_path(&map, start, goal, &careless).is_some());

        let careful = PathfindOptions::for_faction(Faction::Player).avoiding_enemies();
        assert!(find_path(&map, start, goal, &careful).is_none());
    }

    #[test]
    fn test_max_cost_prunes_long_routes() {
        let map = flat_map(8, 1);
        let start = HexCoord::from_offset(0, 0);
        let goal = HexCoord::from_offset(6, 0);

        let tight = PathfindOptions::for_faction(Faction::Player).with_max_cost(3.0);
        assert!(find_path(&map, start, goal, &tight).is_none());

        let loose = PathfindOptions::for_faction(Faction::Player).with_max_cost(6.0);
        assert!(find_path(&map, start, goal, &loose).is_some());
    }

    #[test]
    fn test_reachable_tiles_cheapest_first_excludes_start() {
        let map = flat_map(5, 5);
        let start = HexCoord::from_offset(2, 2);
        let options = PathfindOptions::for_faction(Faction::Player);

        let reachable = reachable_tiles(&map, start, 2.0, &options);
        assert!(!reachable.iter().any(|(c, _)| *c == start));
        assert!(reachable.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!(reachable.iter().all(|(_, cost)| *cost <= 2.0));
        // 6 at distance 1, plus the ring at cost 2
        assert!(reachable.len() > 6);
    }

    #[test]
    fn test_multi_waypoint_path_chains_segments() {
        let map = flat_map(5, 5);
        let options = PathfindOptions::for_faction(Faction::Player);
        let a = HexCoord::from_offset(0, 0);
        let b = HexCoord::from_offset(4, 0);
        let c = HexCoord::from_offset(4, 4);

        let path = multi_waypoint_path(&map, &[a, b, c], &options).unwrap();
        assert_eq!(path.tiles.first(), Some(&a));
        assert_eq!(path.destination(), Some(c));
        assert!(path.tiles.contains(&b));
        // Waypoints are not duplicated at the joins
        let hits = path.tiles.iter().filter(|t| **t == b).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_tactical_positions_prefer_high_ground() {
        let mut map = flat_map(5, 5);
        let target = HexCoord::from_offset(2, 2);
        let hill = target.neighbors()[0];
        map.get_mut(hill).unwrap().terrain = TerrainType::Hills;

        let options = PathfindOptions::for_faction(Faction::Player);
        let positions = tactical_positions(&map, target, &options);
        assert_eq!(positions[0].coordinate, hill);
        assert_eq!(positions[0].tactical_value, 20);
    }

    #[test]
    fn test_zone_of_control_extends_one_past_reach() {
        let map = flat_map(7, 7);
        let position = HexCoord::from_offset(3, 3);
        let zone = zone_of_control(&map, position, 1.0, Faction::Player);

        // Every tile at distance 2 borders a reachable tile
        for coordinate in position.ring(2) {
            if map.contains(coordinate) {
                assert!(zone.contains(&coordinate));
            }
        }
    }
}
