//! Computer-controlled factions: behavior tuning, planning, and turn execution

pub mod faction;
pub mod strategist;
pub mod types;

pub use faction::{AiFactionManager, FactionMemory};
pub use types::{AiDifficulty, AiPersonality, BehaviorConfig, Decision, DecisionKind};
