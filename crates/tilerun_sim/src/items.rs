use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::spatial::Aabb;
use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Coin,
    /// Grants fire power when collected.
    PowerUp,
    /// Tall trigger volume at the end of a level.
    LevelExit,
}

impl ItemKind {
    pub fn half_extents(self) -> Vec2 {
        match self {
            Self::Coin => Vec2::splat(0.3),
            Self::PowerUp => Vec2::splat(0.4),
            Self::LevelExit => Vec2::new(0.5, 5.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub id: EntityId,
    pub kind: ItemKind,
    pub position: Vec2,
}

impl Item {
    pub fn new(id: EntityId, kind: ItemKind, position: Vec2) -> Self {
        Self { id, kind, position }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.kind.half_extents())
    }
}

/// Index of the first item the player box overlaps, if any.
pub fn first_overlap(items: &[Item], player: &Aabb) -> Option<usize> {
    items.iter().position(|item| item.aabb().intersects(player))
}
