//! The strategic hex map: tile storage, queries, and generation

pub mod tile;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::building::BuildingType;
use crate::core::config::OverworldConfig;
use crate::core::error::{OverworldError, Result};
use crate::core::types::Faction;
use crate::hex::HexCoord;
use crate::terrain::TerrainType;

pub use tile::{Army, Building, MapTile};

/// Tile storage keyed by axial coordinate
///
/// Serialized as a flat tile list; the index is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverworldMap {
    #[serde(with = "tile_map")]
    tiles: AHashMap<HexCoord, MapTile>,
    pub width: i32,
    pub height: i32,
}

mod tile_map {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        tiles: &AHashMap<HexCoord, MapTile>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut list: Vec<&MapTile> = tiles.values().collect();
        list.sort_by_key(|tile| (tile.coordinate.r, tile.coordinate.q));
        serde::Serialize::serialize(&list, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<AHashMap<HexCoord, MapTile>, D::Error> {
        let list: Vec<MapTile> = serde::Deserialize::deserialize(deserializer)?;
        Ok(list
            .into_iter()
            .map(|tile| (tile.coordinate, tile))
            .collect())
    }
}

impl OverworldMap {
    pub fn empty(width: i32, height: i32) -> Self {
        Self {
            tiles: AHashMap::new(),
            width,
            height,
        }
    }

    /// Generate a map from the configured dimensions
    ///
    /// Terrain comes from a smooth trigonometric noise field, so the
    /// same dimensions always produce the same layout. The player
    /// capital sits near the northwest corner and the enemy settlement
    /// near the southeast.
    pub fn generate(config: &OverworldConfig) -> Self {
        let mut map = Self::empty(config.map_width, config.map_height);

        for row in 0..config.map_height {
            for col in 0..config.map_width {
                let coordinate = HexCoord::from_offset(col, row);
                let terrain = terrain_at(coordinate);
                let mut tile = MapTile::new(coordinate, terrain);

                if col == 2 && row == 2 {
                    tile.terrain = TerrainType::Plains;
                    tile.building = Some(Building::completed(
                        BuildingType::Settlement,
                        1,
                        Faction::Player,
                    ));
                    tile.controlled_by = Faction::Player;
                    tile.is_capital = true;
                } else if col == config.map_width - 3 && row == config.map_height - 3 {
                    tile.terrain = TerrainType::Plains;
                    tile.building = Some(Building::completed(
                        BuildingType::Settlement,
                        1,
                        Faction::Enemy,
                    ));
                    tile.controlled_by = Faction::Enemy;
                }

                map.tiles.insert(coordinate, tile);
            }
        }

        debug!(
            width = config.map_width,
            height = config.map_height,
            tiles = map.tiles.len(),
            "generated overworld map"
        );
        map
    }

    pub fn insert(&mut self, tile: MapTile) {
        self.tiles.insert(tile.coordinate, tile);
    }

    pub fn get(&self, coordinate: HexCoord) -> Option<&MapTile> {
        self.tiles.get(&coordinate)
    }

    pub fn get_mut(&mut self, coordinate: HexCoord) -> Option<&mut MapTile> {
        self.tiles.get_mut(&coordinate)
    }

    /// Like `get`, but a missing tile is an error
    pub fn tile(&self, coordinate: HexCoord) -> Result<&MapTile> {
        self.get(coordinate)
            .ok_or(OverworldError::TileNotFound(coordinate))
    }

    pub fn tile_mut(&mut self, coordinate: HexCoord) -> Result<&mut MapTile> {
        self.tiles
            .get_mut(&coordinate)
            .ok_or(OverworldError::TileNotFound(coordinate))
    }

    pub fn contains(&self, coordinate: HexCoord) -> bool {
        self.tiles.contains_key(&coordinate)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapTile> {
        self.tiles.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MapTile> {
        self.tiles.values_mut()
    }

    /// Neighboring tiles that exist on the map
    pub fn existing_neighbors(&self, coordinate: HexCoord) -> Vec<&MapTile> {
        coordinate
            .neighbors()
            .iter()
            .filter_map(|neighbor| self.get(*neighbor))
            .collect()
    }

    /// Tiles controlled by a faction
    pub fn tiles_of(&self, faction: Faction) -> impl Iterator<Item = &MapTile> {
        self.tiles
            .values()
            .filter(move |tile| tile.controlled_by == faction)
    }

    /// Completed buildings belonging to a faction
    pub fn buildings_of(&self, faction: Faction) -> impl Iterator<Item = &MapTile> {
        self.tiles.values().filter(move |tile| {
            tile.building
                .as_ref()
                .map(|b| b.faction == faction)
                .unwrap_or(false)
        })
    }

    /// Tiles holding an army of the given faction
    pub fn armies_of(&self, faction: Faction) -> impl Iterator<Item = &MapTile> {
        self.tiles.values().filter(move |tile| {
            tile.army
                .as_ref()
                .map(|army| army.faction == faction)
                .unwrap_or(false)
        })
    }

    /// Count of completed settlements owned by a faction
    pub fn settlement_count(&self, faction: Faction) -> usize {
        self.tiles
            .values()
            .filter(|tile| {
                tile.building
                    .as_ref()
                    .map(|b| {
                        b.kind == BuildingType::Settlement && b.faction == faction && b.is_complete()
                    })
                    .unwrap_or(false)
            })
            .count()
    }
}

/// Deterministic terrain from layered trig noise
fn terrain_at(coordinate: HexCoord) -> TerrainType {
    let q = coordinate.q as f64;
    let r = coordinate.r as f64;
    let noise = (q * 0.3).sin() * (r * 0.3).cos() + (q * 0.1).sin() * (r * 0.1).cos();

    if noise > 0.6 {
        TerrainType::Mountains
    } else if noise > 0.3 {
        TerrainType::Hills
    } else if noise > 0.1 {
        TerrainType::Forest
    } else if noise < -0.3 {
        TerrainType::River
    } else if noise < -0.1 {
        TerrainType::Swamp
    } else {
        TerrainType::Plains
    }
}
