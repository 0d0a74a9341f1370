//! Core type definitions used throughout the codebase

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Faction ownership tag on tiles, buildings, and armies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
    Allied,
    Neutral,
}

impl Faction {
    /// Two factions are hostile when both are non-neutral, they differ,
    /// and they are not the Player/Allied pair.
    pub fn is_hostile_to(&self, other: &Faction) -> bool {
        if self == other || *self == Faction::Neutral || *other == Faction::Neutral {
            return false;
        }
        !matches!(
            (self, other),
            (Faction::Player, Faction::Allied) | (Faction::Allied, Faction::Player)
        )
    }
}

/// Resource types generated by terrain and buildings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Gold,
    Steel,
    Wood,
    Stone,
    Food,
    ManaCrystals,
    Horses,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Gold,
        ResourceKind::Steel,
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Food,
        ResourceKind::ManaCrystals,
        ResourceKind::Horses,
    ];
}

/// A faction-level resource ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stockpile {
    amounts: AHashMap<ResourceKind, u32>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stockpile from (resource, amount) pairs
    pub fn from_amounts(amounts: &[(ResourceKind, u32)]) -> Self {
        let mut stockpile = Self::new();
        for (kind, amount) in amounts {
            stockpile.add(*kind, *amount);
        }
        stockpile
    }

    /// Current amount of a resource
    pub fn get(&self, kind: ResourceKind) -> u32 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        *self.amounts.entry(kind).or_insert(0) += amount;
    }

    /// Check whether the ledger covers every entry of a cost slice
    pub fn can_afford(&self, cost: &[(ResourceKind, u32)]) -> bool {
        cost.iter().all(|(kind, amount)| self.get(*kind) >= *amount)
    }

    /// Deduct a cost, all or nothing. Returns false if unaffordable.
    pub fn spend(&mut self, cost: &[(ResourceKind, u32)]) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (kind, amount) in cost {
            if let Some(current) = self.amounts.get_mut(kind) {
                *current -= amount;
            }
        }
        true
    }

    /// Apply a signed change, clamping at zero
    pub fn apply_delta(&mut self, kind: ResourceKind, delta: i32) {
        let current = self.get(kind) as i64;
        let next = (current + delta as i64).max(0) as u32;
        self.amounts.insert(kind, next);
    }
}

/// Broad unit classes, enough to drive movement and strength formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    Infantry,
    HeavyInfantry,
    Cavalry,
    Archer,
    Mage,
    Flying,
}

impl UnitClass {
    /// Classes that speed an army up when they dominate its composition
    pub fn is_cavalry_class(&self) -> bool {
        matches!(self, UnitClass::Cavalry | UnitClass::Flying)
    }

    /// Classes that slow an army down when they dominate its composition
    pub fn is_heavy_class(&self) -> bool {
        matches!(self, UnitClass::HeavyInfantry | UnitClass::Cavalry)
    }
}

/// A named group of units fighting as one body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Squad {
    pub name: String,
    pub units: Vec<UnitClass>,
    pub strength: f32,
    pub max_strength: f32,
}

impl Squad {
    pub fn new(name: impl Into<String>, units: Vec<UnitClass>, strength: f32) -> Self {
        Self {
            name: name.into(),
            units,
            strength,
            max_strength: strength,
        }
    }

    /// Restore strength, capped at the squad's maximum
    pub fn heal(&mut self, amount: f32) {
        self.strength = (self.strength + amount).min(self.max_strength);
    }

    pub fn is_routed(&self) -> bool {
        self.strength <= 0.0
    }
}

/// Unit statistics that building auras can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Str,
    Mag,
    Skl,
    Arm,
    Ldr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_hostility() {
        assert!(Faction::Player.is_hostile_to(&Faction::Enemy));
        assert!(Faction::Enemy.is_hostile_to(&Faction::Allied));
        assert!(!Faction::Player.is_hostile_to(&Faction::Player));
        assert!(!Faction::Player.is_hostile_to(&Faction::Neutral));
        assert!(!Faction::Neutral.is_hostile_to(&Faction::Enemy));
        assert!(!Faction::Player.is_hostile_to(&Faction::Allied));
        assert!(!Faction::Allied.is_hostile_to(&Faction::Player));
    }

    #[test]
    fn test_stockpile_spend_all_or_nothing() {
        let mut stockpile = Stockpile::from_amounts(&[
            (ResourceKind::Wood, 50),
            (ResourceKind::Gold, 100),
        ]);

        // Unaffordable cost leaves the ledger untouched
        assert!(!stockpile.spend(&[(ResourceKind::Wood, 30), (ResourceKind::Stone, 10)]));
        assert_eq!(stockpile.get(ResourceKind::Wood), 50);

        assert!(stockpile.spend(&[(ResourceKind::Wood, 30), (ResourceKind::Gold, 60)]));
        assert_eq!(stockpile.get(ResourceKind::Wood), 20);
        assert_eq!(stockpile.get(ResourceKind::Gold), 40);
    }

    #[test]
    fn test_stockpile_delta_clamps_at_zero() {
        let mut stockpile = Stockpile::from_amounts(&[(ResourceKind::Food, 20)]);
        stockpile.apply_delta(ResourceKind::Food, -50);
        assert_eq!(stockpile.get(ResourceKind::Food), 0);

        stockpile.apply_delta(ResourceKind::Food, 15);
        assert_eq!(stockpile.get(ResourceKind::Food), 15);
    }

    #[test]
    fn test_squad_heal_caps_at_max() {
        let mut squad = Squad::new("First Spears", vec![UnitClass::Infantry], 80.0);
        squad.strength = 40.0;
        squad.heal(100.0);
        assert_eq!(squad.strength, 80.0);
    }
}
