//! Hexmarch - Strategic Overworld Campaign Engine

pub mod ai;
pub mod building;
pub mod core;
pub mod hex;
pub mod map;
pub mod movement;
pub mod overworld;
pub mod pathfinding;
pub mod terrain;
