use thiserror::Error;

use crate::core::types::Faction;
use crate::hex::HexCoord;

#[derive(Error, Debug)]
pub enum OverworldError {
    #[error("Tile not found at ({}, {})", .0.q, .0.r)]
    TileNotFound(HexCoord),

    #[error("No army at ({}, {})", .0.q, .0.r)]
    NoArmy(HexCoord),

    #[error("Army at ({}, {}) does not belong to {1:?}", .0.q, .0.r)]
    NotOwnArmy(HexCoord, Faction),

    #[error("Tile at ({}, {}) is occupied", .0.q, .0.r)]
    TileOccupied(HexCoord),

    #[error("No path to ({}, {})", .0.q, .0.r)]
    NoPath(HexCoord),

    #[error("Insufficient movement points for any progress")]
    NoMovementProgress,

    #[error("Insufficient resources for {0:?}")]
    InsufficientResources(Faction),

    #[error("Invalid build order: {0}")]
    InvalidBuild(String),

    #[error("AI faction {0:?} not initialized")]
    FactionNotInitialized(Faction),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, OverworldError>;
