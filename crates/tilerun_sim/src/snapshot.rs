//! Plain, serializable views of the world for whatever draws it.

use serde::Serialize;

use crate::enemy::EnemySubtype;
use crate::items::ItemKind;
use crate::progression::Phase;
use crate::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub facing: f32,
    pub grounded: bool,
    pub fire_power: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: EntityId,
    pub subtype: EnemySubtype,
    pub position: [f32; 2],
    pub facing: f32,
    pub squash: [f32; 2],
    pub dying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub id: EntityId,
    pub kind: ItemKind,
    pub position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub level_index: usize,
    pub level_name: String,
    pub phase: Phase,
    pub lives: u32,
    pub score: u64,
    pub time_remaining: f32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub items: Vec<ItemView>,
}
