//! Discrete things that happened during a tick, for presentation layers.
//!
//! The simulation never calls back into a renderer. It pushes events here and
//! the host drains them once per tick.

use glam::Vec2;
use serde::Serialize;

use crate::enemy::EnemySubtype;
use crate::items::ItemKind;
use crate::progression::Phase;
use crate::spatial::TileCoord;
use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Fell,
    Hazard,
    Enemy,
    TimeUp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    BlockBumped { coord: TileCoord },
    ScorePopup { position: [f32; 2], amount: u64 },
    EnemyKilled { id: EntityId, subtype: EnemySubtype },
    EnemyRemoved { id: EntityId },
    ProjectileSpawned { id: EntityId },
    ProjectileRemoved { id: EntityId },
    ItemSpawned { id: EntityId, kind: ItemKind },
    ItemCollected { id: EntityId, kind: ItemKind },
    PlayerDied { cause: DeathCause },
    PlayerRespawned { position: [f32; 2] },
    LevelChanged { index: usize, name: String },
    PhaseChanged { from: Phase, to: Phase },
    ScoreChanged { score: u64 },
    LivesChanged { lives: u32 },
    TimeChanged { seconds: u32 },
}

impl SimEvent {
    pub fn score_popup(position: Vec2, amount: u64) -> Self {
        Self::ScorePopup {
            position: position.to_array(),
            amount,
        }
    }

    pub fn player_respawned(position: Vec2) -> Self {
        Self::PlayerRespawned {
            position: position.to_array(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_queue() {
        let mut queue = EventQueue::default();
        queue.push(SimEvent::ScoreChanged { score: 50 });
        queue.push(SimEvent::LivesChanged { lives: 9 });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let json = serde_json::to_string(&SimEvent::PlayerDied {
            cause: DeathCause::TimeUp,
        })
        .expect("event should serialize");
        assert_eq!(json, r#"{"event":"player_died","cause":"time_up"}"#);
    }
}
