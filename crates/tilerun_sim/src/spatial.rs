//! Spatial index: the gameplay truth of which tiles block, burn, or bump.
//!
//! Every query is a hash lookup on an integer tile coordinate, never a scan
//! over drawable objects. Physics and AI ask these questions several times
//! per sub-step, so they must stay O(1).
//!
//! Tiles are unit squares centred on integer coordinates: tile `(x, y)` spans
//! `[x - 0.5, x + 0.5) × [y - 0.5, y + 0.5)` in world units.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::level::{BlockContent, LevelLayout, TileCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// World coordinate to tile index along one axis.
#[inline]
pub fn tile(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    /// Strict overlap; boxes that merely touch do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        d.x < self.half.x + other.half.x && d.y < self.half.y + other.half.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Question(BlockContent),
    Brick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockState {
    pub kind: BlockKind,
    pub active: bool,
}

/// Result of hitting an activatable block from below. A bump always happens;
/// `reward` is only set the first time a question block is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHit {
    pub coord: TileCoord,
    pub reward: Option<BlockContent>,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    solids: HashSet<TileCoord>,
    hazards: HashSet<TileCoord>,
    blocks: HashMap<TileCoord, BlockState>,
}

impl SpatialIndex {
    pub fn from_layout(layout: &LevelLayout) -> Self {
        let mut index = Self::default();
        for (coord, cell) in layout.tiles() {
            match cell {
                TileCell::Empty | TileCell::SpawnMarker => {}
                TileCell::SolidGround | TileCell::SolidWall => {
                    index.solids.insert(coord);
                }
                TileCell::Pipe => {
                    // Pipes are two tiles wide.
                    index.solids.insert(coord);
                    index.solids.insert(TileCoord::new(coord.x + 1, coord.y));
                }
                TileCell::Question { content, active } => {
                    index.solids.insert(coord);
                    index.blocks.insert(
                        coord,
                        BlockState {
                            kind: BlockKind::Question(content),
                            active,
                        },
                    );
                }
                TileCell::Brick => {
                    index.solids.insert(coord);
                    index.blocks.insert(
                        coord,
                        BlockState {
                            kind: BlockKind::Brick,
                            active: true,
                        },
                    );
                }
                TileCell::Lava => {
                    index.solids.insert(coord);
                    index.hazards.insert(coord);
                }
            }
        }
        index
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.solids.contains(&TileCoord { x, y })
    }

    pub fn is_hazard(&self, x: i32, y: i32) -> bool {
        self.hazards.contains(&TileCoord { x, y })
    }

    pub fn block(&self, coord: TileCoord) -> Option<&BlockState> {
        self.blocks.get(&coord)
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Hit the block at `coord` from below. Returns `None` for anything that
    /// is not a question or brick block.
    pub fn activate(&mut self, coord: TileCoord) -> Option<BlockHit> {
        let block = self.blocks.get_mut(&coord)?;
        let reward = match block.kind {
            BlockKind::Question(content) if block.active => {
                block.active = false;
                Some(content)
            }
            BlockKind::Question(_) | BlockKind::Brick => None,
        };
        Some(BlockHit { coord, reward })
    }
}
