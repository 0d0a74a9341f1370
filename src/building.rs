//! Building data tables and level-scaling formulas
//!
//! Each building kind carries a static cost, build time, max level,
//! per-turn yield, and optional upgrade ladder. Level scaling is
//! uniform across kinds: +50% generation per level, +25% defense per
//! level, +50% healing per level, +1 vision per level.

use serde::{Deserialize, Serialize};

use crate::core::types::ResourceKind;

/// Structures that can occupy a map tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    Settlement,
    Castle,
    Church,
    Farm,
    Blacksmith,
    Outpost,
    Tower,
    Mine,
    LumberMill,
}

/// One rung of an upgrade ladder
#[derive(Debug, Clone, Copy)]
pub struct UpgradeStep {
    pub level: u32,
    pub cost: &'static [(ResourceKind, u32)],
}

impl BuildingType {
    pub const ALL: [BuildingType; 9] = [
        BuildingType::Settlement,
        BuildingType::Castle,
        BuildingType::Church,
        BuildingType::Farm,
        BuildingType::Blacksmith,
        BuildingType::Outpost,
        BuildingType::Tower,
        BuildingType::Mine,
        BuildingType::LumberMill,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Settlement => "Settlement",
            Self::Castle => "Castle",
            Self::Church => "Church",
            Self::Farm => "Farm",
            Self::Blacksmith => "Blacksmith",
            Self::Outpost => "Outpost",
            Self::Tower => "Tower",
            Self::Mine => "Mine",
            Self::LumberMill => "Lumber Mill",
        }
    }

    /// Resources consumed to start construction
    pub fn build_cost(&self) -> &'static [(ResourceKind, u32)] {
        match self {
            Self::Settlement => &[
                (ResourceKind::Wood, 50),
                (ResourceKind::Stone, 30),
                (ResourceKind::Gold, 100),
            ],
            Self::Castle => &[
                (ResourceKind::Stone, 200),
                (ResourceKind::Steel, 100),
                (ResourceKind::Gold, 500),
            ],
            Self::Church => &[
                (ResourceKind::Wood, 75),
                (ResourceKind::Stone, 100),
                (ResourceKind::Gold, 200),
            ],
            Self::Farm => &[(ResourceKind::Wood, 30), (ResourceKind::Gold, 50)],
            Self::Blacksmith => &[
                (ResourceKind::Wood, 40),
                (ResourceKind::Stone, 60),
                (ResourceKind::Steel, 20),
                (ResourceKind::Gold, 150),
            ],
            Self::Outpost => &[(ResourceKind::Wood, 25), (ResourceKind::Gold, 75)],
            Self::Tower => &[
                (ResourceKind::Stone, 80),
                (ResourceKind::ManaCrystals, 10),
                (ResourceKind::Gold, 200),
            ],
            Self::Mine => &[
                (ResourceKind::Wood, 60),
                (ResourceKind::Steel, 30),
                (ResourceKind::Gold, 200),
            ],
            Self::LumberMill => &[
                (ResourceKind::Wood, 40),
                (ResourceKind::Steel, 15),
                (ResourceKind::Gold, 100),
            ],
        }
    }

    /// Construction duration in turns
    pub fn build_time(&self) -> u32 {
        match self {
            Self::Settlement => 3,
            Self::Castle => 8,
            Self::Church => 4,
            Self::Farm => 2,
            Self::Blacksmith => 5,
            Self::Outpost => 2,
            Self::Tower => 4,
            Self::Mine => 6,
            Self::LumberMill => 3,
        }
    }

    pub fn max_level(&self) -> u32 {
        match self {
            Self::Settlement => 5,
            Self::Castle => 3,
            Self::Church => 3,
            Self::Farm => 4,
            Self::Blacksmith => 4,
            Self::Outpost => 2,
            Self::Tower => 3,
            Self::Mine => 4,
            Self::LumberMill => 3,
        }
    }

    /// Per-turn yield at level 1
    pub fn base_generation(&self) -> &'static [(ResourceKind, u32)] {
        match self {
            Self::Settlement => &[(ResourceKind::Gold, 10), (ResourceKind::Food, 5)],
            Self::Castle => &[(ResourceKind::Gold, 20)],
            Self::Church => &[(ResourceKind::Gold, 5)],
            Self::Farm => &[(ResourceKind::Food, 15)],
            Self::Blacksmith => &[(ResourceKind::Steel, 8)],
            Self::Outpost => &[(ResourceKind::Gold, 5)],
            Self::Tower => &[(ResourceKind::ManaCrystals, 3)],
            Self::Mine => &[(ResourceKind::Stone, 10), (ResourceKind::Steel, 5)],
            Self::LumberMill => &[(ResourceKind::Wood, 20)],
        }
    }

    /// Percent defense bonus at level 1
    pub fn base_defensive_bonus(&self) -> u32 {
        match self {
            Self::Castle => 50,
            Self::Outpost => 15,
            _ => 0,
        }
    }

    /// Strength restored per turn to garrisoned armies, at level 1
    pub fn base_healing_rate(&self) -> u32 {
        match self {
            Self::Settlement => 5,
            Self::Castle => 15,
            Self::Church => 20,
            _ => 0,
        }
    }

    /// Tiles of sight granted at level 1
    pub fn base_vision_range(&self) -> u32 {
        match self {
            Self::Castle => 3,
            Self::Outpost => 2,
            Self::Tower => 4,
            _ => 0,
        }
    }

    /// Percent discount on recruiting at this site
    pub fn recruitment_bonus(&self) -> u32 {
        match self {
            Self::Castle => 25,
            _ => 0,
        }
    }

    /// The full upgrade ladder, one step per level above 1
    pub fn upgrade_steps(&self) -> &'static [UpgradeStep] {
        match self {
            Self::Settlement => &[
                UpgradeStep {
                    level: 2,
                    cost: &[
                        (ResourceKind::Wood, 75),
                        (ResourceKind::Stone, 50),
                        (ResourceKind::Gold, 150),
                    ],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[
                        (ResourceKind::Wood, 100),
                        (ResourceKind::Stone, 75),
                        (ResourceKind::Gold, 200),
                    ],
                },
                UpgradeStep {
                    level: 4,
                    cost: &[
                        (ResourceKind::Wood, 150),
                        (ResourceKind::Stone, 100),
                        (ResourceKind::Gold, 300),
                    ],
                },
                UpgradeStep {
                    level: 5,
                    cost: &[
                        (ResourceKind::Wood, 200),
                        (ResourceKind::Stone, 150),
                        (ResourceKind::Gold, 500),
                    ],
                },
            ],
            Self::Castle => &[
                UpgradeStep {
                    level: 2,
                    cost: &[
                        (ResourceKind::Stone, 300),
                        (ResourceKind::Steel, 150),
                        (ResourceKind::Gold, 750),
                    ],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[
                        (ResourceKind::Stone, 500),
                        (ResourceKind::Steel, 250),
                        (ResourceKind::Gold, 1000),
                    ],
                },
            ],
            Self::Church => &[
                UpgradeStep {
                    level: 2,
                    cost: &[
                        (ResourceKind::Wood, 100),
                        (ResourceKind::Stone, 150),
                        (ResourceKind::Gold, 300),
                    ],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[
                        (ResourceKind::Wood, 150),
                        (ResourceKind::Stone, 200),
                        (ResourceKind::Gold, 500),
                    ],
                },
            ],
            Self::Farm => &[
                UpgradeStep {
                    level: 2,
                    cost: &[(ResourceKind::Wood, 50), (ResourceKind::Gold, 75)],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[(ResourceKind::Wood, 75), (ResourceKind::Gold, 100)],
                },
                UpgradeStep {
                    level: 4,
                    cost: &[(ResourceKind::Wood, 100), (ResourceKind::Gold, 150)],
                },
            ],
            Self::Blacksmith => &[
                UpgradeStep {
                    level: 2,
                    cost: &[
                        (ResourceKind::Stone, 80),
                        (ResourceKind::Steel, 30),
                        (ResourceKind::Gold, 200),
                    ],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[
                        (ResourceKind::Stone, 120),
                        (ResourceKind::Steel, 50),
                        (ResourceKind::Gold, 300),
                    ],
                },
                UpgradeStep {
                    level: 4,
                    cost: &[
                        (ResourceKind::Stone, 200),
                        (ResourceKind::Steel, 80),
                        (ResourceKind::Gold, 500),
                    ],
                },
            ],
            Self::Outpost => &[UpgradeStep {
                level: 2,
                cost: &[
                    (ResourceKind::Wood, 40),
                    (ResourceKind::Stone, 30),
                    (ResourceKind::Gold, 100),
                ],
            }],
            Self::Tower => &[
                UpgradeStep {
                    level: 2,
                    cost: &[
                        (ResourceKind::Stone, 120),
                        (ResourceKind::ManaCrystals, 20),
                        (ResourceKind::Gold, 300),
                    ],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[
                        (ResourceKind::Stone, 200),
                        (ResourceKind::ManaCrystals, 40),
                        (ResourceKind::Gold, 500),
                    ],
                },
            ],
            Self::Mine => &[
                UpgradeStep {
                    level: 2,
                    cost: &[
                        (ResourceKind::Wood, 80),
                        (ResourceKind::Steel, 50),
                        (ResourceKind::Gold, 300),
                    ],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[(ResourceKind::Steel, 80), (ResourceKind::Gold, 500)],
                },
                UpgradeStep {
                    level: 4,
                    cost: &[
                        (ResourceKind::Steel, 120),
                        (ResourceKind::ManaCrystals, 20),
                        (ResourceKind::Gold, 800),
                    ],
                },
            ],
            Self::LumberMill => &[
                UpgradeStep {
                    level: 2,
                    cost: &[
                        (ResourceKind::Wood, 60),
                        (ResourceKind::Steel, 25),
                        (ResourceKind::Gold, 150),
                    ],
                },
                UpgradeStep {
                    level: 3,
                    cost: &[
                        (ResourceKind::Wood, 100),
                        (ResourceKind::Steel, 40),
                        (ResourceKind::Gold, 250),
                    ],
                },
            ],
        }
    }

    /// Per-turn yield at a given level, +50% per level past the first
    pub fn generation_at_level(&self, level: u32) -> Vec<(ResourceKind, u32)> {
        let multiplier = 1.0 + (level.saturating_sub(1)) as f32 * 0.5;
        self.base_generation()
            .iter()
            .map(|(kind, amount)| (*kind, (*amount as f32 * multiplier).floor() as u32))
            .collect()
    }

    /// Cost of the next upgrade, or None when already at max level
    pub fn upgrade_cost(&self, current_level: u32) -> Option<&'static [(ResourceKind, u32)]> {
        if current_level >= self.max_level() {
            return None;
        }
        self.upgrade_steps()
            .iter()
            .find(|step| step.level == current_level + 1)
            .map(|step| step.cost)
    }

    /// Percent defense bonus at a given level, +25% per level past the first
    pub fn defensive_bonus_at_level(&self, level: u32) -> u32 {
        let base = self.base_defensive_bonus() as f32;
        let multiplier = 1.0 + (level.saturating_sub(1)) as f32 * 0.25;
        (base * multiplier).floor() as u32
    }

    /// Healing per turn at a given level, +50% per level past the first
    pub fn healing_at_level(&self, level: u32) -> u32 {
        let base = self.base_healing_rate() as f32;
        let multiplier = 1.0 + (level.saturating_sub(1)) as f32 * 0.5;
        (base * multiplier).floor() as u32
    }

    /// Vision range at a given level, +1 tile per level past the first
    pub fn vision_at_level(&self, level: u32) -> u32 {
        let base = self.base_vision_range();
        if base == 0 {
            return 0;
        }
        base + level.saturating_sub(1)
    }
}

/// Building kinds whose yield includes the given resource
pub fn producers_of(resource: ResourceKind) -> Vec<BuildingType> {
    BuildingType::ALL
        .iter()
        .copied()
        .filter(|kind| {
            kind.base_generation()
                .iter()
                .any(|(produced, _)| *produced == resource)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_scales_by_half_per_level() {
        let base = BuildingType::Farm.generation_at_level(1);
        assert_eq!(base, vec![(ResourceKind::Food, 15)]);

        let upgraded = BuildingType::Farm.generation_at_level(3);
        assert_eq!(upgraded, vec![(ResourceKind::Food, 30)]);
    }

    #[test]
    fn test_upgrade_ladder_stops_at_max_level() {
        let cost = BuildingType::Outpost.upgrade_cost(1).unwrap();
        assert!(cost.contains(&(ResourceKind::Gold, 100)));
        assert!(BuildingType::Outpost.upgrade_cost(2).is_none());
        assert!(BuildingType::Settlement.upgrade_cost(5).is_none());
    }

    #[test]
    fn test_every_ladder_reaches_max_level() {
        for kind in BuildingType::ALL {
            for level in 2..=kind.max_level() {
                assert!(
                    kind.upgrade_steps().iter().any(|step| step.level == level),
                    "{:?} missing upgrade to level {}",
                    kind,
                    level
                );
            }
        }
    }

    #[test]
    fn test_defense_and_healing_scaling() {
        assert_eq!(BuildingType::Castle.defensive_bonus_at_level(1), 50);
        assert_eq!(BuildingType::Castle.defensive_bonus_at_level(3), 75);
        assert_eq!(BuildingType::Church.healing_at_level(2), 30);
        assert_eq!(BuildingType::Farm.defensive_bonus_at_level(4), 0);
    }

    #[test]
    fn test_vision_grows_one_per_level() {
        assert_eq!(BuildingType::Tower.vision_at_level(1), 4);
        assert_eq!(BuildingType::Tower.vision_at_level(3), 6);
        assert_eq!(BuildingType::Farm.vision_at_level(4), 0);
    }

    #[test]
    fn test_producers_of_resource() {
        let food = producers_of(ResourceKind::Food);
        assert!(food.contains(&BuildingType::Farm));
        assert!(food.contains(&BuildingType::Settlement));
        assert!(!food.contains(&BuildingType::Mine));
    }
}
