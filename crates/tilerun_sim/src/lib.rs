//! Headless tile platformer simulation.
//!
//! Feed a [`sim::Simulation`] one [`tilerun_core::input::InputState`] per
//! frame; read back a [`snapshot::Snapshot`] and the drained
//! [`events::SimEvent`]s.

pub mod config;
pub mod enemy;
pub mod error;
pub mod events;
pub mod items;
pub mod level;
pub mod levels;
pub mod physics;
pub mod progression;
pub mod projectile;
pub mod sim;
pub mod snapshot;
pub mod spatial;

use serde::Serialize;

/// Stable handle for enemies, items and projectiles within one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub u32);
