//! Strategic events and the campaign log

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::building::BuildingType;
use crate::core::types::{Faction, ResourceKind};
use crate::hex::HexCoord;

/// Random happenings that adjust a faction's economy for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategicEvent {
    BanditRaid,
    GoodHarvest,
    MerchantCaravan,
}

impl StrategicEvent {
    pub const ALL: [StrategicEvent; 3] = [
        StrategicEvent::BanditRaid,
        StrategicEvent::GoodHarvest,
        StrategicEvent::MerchantCaravan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BanditRaid => "Bandit Raid",
            Self::GoodHarvest => "Good Harvest",
            Self::MerchantCaravan => "Merchant Caravan",
        }
    }

    /// Signed resource deltas applied when the event fires
    pub fn resource_changes(&self) -> &'static [(ResourceKind, i32)] {
        match self {
            Self::BanditRaid => &[(ResourceKind::Gold, -50), (ResourceKind::Food, -25)],
            Self::GoodHarvest => &[(ResourceKind::Food, 100)],
            Self::MerchantCaravan => &[(ResourceKind::Gold, 75)],
        }
    }

    pub fn duration(&self) -> u32 {
        1
    }
}

/// An event currently in effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event: StrategicEvent,
    pub affected: Faction,
    pub turns_active: u32,
    pub max_turns: u32,
}

impl ActiveEvent {
    pub fn new(event: StrategicEvent, affected: Faction) -> Self {
        Self {
            event,
            affected,
            turns_active: 0,
            max_turns: event.duration(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.turns_active >= self.max_turns
    }
}

/// What happened, recorded per log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogKind {
    TurnBegan {
        active: Faction,
    },
    ArmyMoved {
        faction: Faction,
        from: HexCoord,
        to: HexCoord,
    },
    BattleInitiated {
        location: HexCoord,
        attacker: Faction,
        defender: Faction,
    },
    ConstructionStarted {
        coordinate: HexCoord,
        kind: BuildingType,
    },
    ConstructionCompleted {
        coordinate: HexCoord,
        kind: BuildingType,
    },
    BuildingUpgraded {
        coordinate: HexCoord,
        kind: BuildingType,
        level: u32,
    },
    EventFired {
        event: StrategicEvent,
        affected: Faction,
    },
    EventEnded {
        event: StrategicEvent,
    },
    GameWon {
        winner: Faction,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub kind: LogKind,
}

/// Bounded campaign history, oldest entries dropped first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, turn: u32, kind: LogKind) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry { turn, kind });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deltas() {
        let raid: i32 = StrategicEvent::BanditRaid
            .resource_changes()
            .iter()
            .map(|(_, delta)| *delta)
            .sum();
        assert!(raid < 0);

        let harvest = StrategicEvent::GoodHarvest.resource_changes();
        assert_eq!(harvest, &[(ResourceKind::Food, 100)]);
    }

    #[test]
    fn test_active_event_expiry() {
        let mut active = ActiveEvent::new(StrategicEvent::MerchantCaravan, Faction::Player);
        assert!(!active.is_expired());
        active.turns_active += 1;
        assert!(active.is_expired());
    }

    #[test]
    fn test_log_drops_oldest_at_capacity() {
        let mut log = EventLog::with_capacity(2);
        log.record(1, LogKind::TurnBegan { active: Faction::Player });
        log.record(2, LogKind::TurnBegan { active: Faction::Enemy });
        log.record(3, LogKind::TurnBegan { active: Faction::Player });

        assert_eq!(log.len(), 2);
        assert_eq!(log.iter().next().unwrap().turn, 2);
        assert_eq!(log.latest().unwrap().turn, 3);
    }
}
