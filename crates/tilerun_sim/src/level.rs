//! Level maps: ASCII rows in, typed tile layout plus spawn lists out.
//!
//! Rows are authored top-to-bottom; world `y` grows upward from the bottom
//! row. Parsing happens once per level load. The gap-fix pass runs before
//! anything else sees the layout, so physics never meets a pit wider than
//! `MAX_GAP_RUN` columns that the author did not close.
//!
//! Marker vocabulary:
//!
//! | char | meaning              | char | meaning        |
//! |------|----------------------|------|----------------|
//! | `.`  | empty                | `E`  | Normal enemy   |
//! | `#`  | ground               | `S`  | Spiky enemy    |
//! | `W`  | wall                 | `G`  | Ghoul enemy    |
//! | `?`  | question (coin)      | `f`  | Fish enemy     |
//! | `!`  | question (power-up)  | `K`  | Shelled enemy  |
//! | `B`  | brick                | `C`  | coin           |
//! | `L`  | lava                 | `F`  | exit flag      |
//! | `T`  | pipe (2 wide)        | `P`  | player spawn   |

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enemy::EnemySubtype;
use crate::error::LevelError;
use crate::items::ItemKind;
use crate::spatial::TileCoord;

/// Longest run of footing-free columns tolerated before a tile is synthesized.
pub const MAX_GAP_RUN: u32 = 4;
/// The synthesized tile goes this many columns behind the column that broke the limit.
pub const GAP_FIX_BACKOFF: usize = 2;
pub const INITIAL_SAFE_HEIGHT: i32 = 2;
pub const DEFAULT_SPAWN: Vec2 = Vec2::new(2.0, 5.0);

const EXIT_TRIGGER_LIFT: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Surface,
    /// Reduced gravity, thicker air, and jump impulses that can repeat.
    Underwater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockContent {
    Coin,
    PowerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCell {
    Empty,
    SolidGround,
    SolidWall,
    Pipe,
    Question { content: BlockContent, active: bool },
    Brick,
    Lava,
    SpawnMarker,
}

impl TileCell {
    pub fn is_solid(self) -> bool {
        !matches!(self, Self::Empty | Self::SpawnMarker)
    }

    /// Tiles a player can safely stand on. Lava blocks movement but is not footing.
    pub fn is_footing(self) -> bool {
        self.is_solid() && self != Self::Lava
    }
}

enum Marker {
    Tile(TileCell),
    Spawn,
    Enemy(EnemySubtype),
    Item(ItemKind),
}

fn decode_marker(c: char) -> Option<Marker> {
    let marker = match c {
        '.' => Marker::Tile(TileCell::Empty),
        '#' => Marker::Tile(TileCell::SolidGround),
        'W' => Marker::Tile(TileCell::SolidWall),
        '?' => Marker::Tile(TileCell::Question {
            content: BlockContent::Coin,
            active: true,
        }),
        '!' => Marker::Tile(TileCell::Question {
            content: BlockContent::PowerUp,
            active: true,
        }),
        'B' => Marker::Tile(TileCell::Brick),
        'L' => Marker::Tile(TileCell::Lava),
        'T' => Marker::Tile(TileCell::Pipe),
        'P' => Marker::Spawn,
        'E' => Marker::Enemy(EnemySubtype::Normal),
        'S' => Marker::Enemy(EnemySubtype::Spiky),
        'G' => Marker::Enemy(EnemySubtype::Ghoul),
        'f' => Marker::Enemy(EnemySubtype::Fish),
        'K' => Marker::Enemy(EnemySubtype::Shelled),
        'C' => Marker::Item(ItemKind::Coin),
        'F' => Marker::Item(ItemKind::LevelExit),
        _ => return None,
    };
    Some(marker)
}

/// One level as authored: a name, an environment, and its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    #[serde(default)]
    pub environment: Environment,
    pub rows: Vec<String>,
}

impl LevelDef {
    pub fn from_rows(name: &str, environment: Environment, rows: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            environment,
            rows: rows.iter().map(|row| row.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelPack {
    pub levels: Vec<LevelDef>,
}

impl LevelPack {
    pub fn new(levels: Vec<LevelDef>) -> Self {
        Self { levels }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let pack: LevelPack = serde_json::from_str(raw)
            .map_err(|e| format!("Failed to parse level pack JSON: {e}"))?;
        if pack.levels.is_empty() {
            return Err("Level pack validation failed: levels array is empty".to_string());
        }
        Ok(pack)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&LevelDef, LevelError> {
        self.levels.get(index).ok_or(LevelError::LevelsExhausted {
            requested: index,
            count: self.levels.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub subtype: EnemySubtype,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub name: String,
    pub environment: Environment,
    pub width: i32,
    pub height: i32,
    /// Row-major with row 0 at the bottom of the map.
    cells: Vec<TileCell>,
    pub spawn: Vec2,
    pub spawn_from_marker: bool,
    pub enemies: Vec<EnemySpawn>,
    pub items: Vec<ItemSpawn>,
    /// Tiles inserted by the gap fix, in scan order.
    pub synthesized: Vec<TileCoord>,
}

impl LevelLayout {
    pub fn parse(def: &LevelDef) -> Result<Self, LevelError> {
        let malformed = |reason: String| LevelError::Malformed {
            level: def.name.clone(),
            reason,
        };

        let height = def.rows.len();
        if height == 0 {
            return Err(malformed("no rows".to_string()));
        }
        let width = def.rows[0].chars().count();
        if width == 0 {
            return Err(malformed("rows are empty".to_string()));
        }
        for (row_index, row) in def.rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(malformed(format!(
                    "row {row_index} has length {len}, expected {width}"
                )));
            }
        }

        let mut layout = Self {
            name: def.name.clone(),
            environment: def.environment,
            width: width as i32,
            height: height as i32,
            cells: vec![TileCell::Empty; width * height],
            spawn: DEFAULT_SPAWN,
            spawn_from_marker: false,
            enemies: Vec::new(),
            items: Vec::new(),
            synthesized: Vec::new(),
        };

        for (row_index, row) in def.rows.iter().enumerate() {
            let y = (height - 1 - row_index) as i32;
            for (x, c) in row.chars().enumerate() {
                let x = x as i32;
                let marker = decode_marker(c).ok_or_else(|| {
                    malformed(format!("unknown marker '{c}' at column {x}, row {row_index}"))
                })?;
                let here = Vec2::new(x as f32, y as f32);
                match marker {
                    Marker::Tile(cell) => layout.set(TileCoord::new(x, y), cell),
                    Marker::Spawn => {
                        layout.set(TileCoord::new(x, y), TileCell::SpawnMarker);
                        if layout.spawn_from_marker {
                            log::warn!(
                                "Level '{}' has more than one spawn marker; keeping the first",
                                def.name
                            );
                        } else {
                            layout.spawn = here + Vec2::Y;
                            layout.spawn_from_marker = true;
                        }
                    }
                    Marker::Enemy(subtype) => layout.enemies.push(EnemySpawn {
                        subtype,
                        position: here + Vec2::new(0.0, 0.5),
                    }),
                    Marker::Item(ItemKind::LevelExit) => layout.items.push(ItemSpawn {
                        kind: ItemKind::LevelExit,
                        position: here + Vec2::new(0.0, EXIT_TRIGGER_LIFT),
                    }),
                    Marker::Item(kind) => layout.items.push(ItemSpawn {
                        kind,
                        position: here,
                    }),
                }
            }
        }

        if !layout.spawn_from_marker {
            log::warn!(
                "Level '{}' has no spawn marker; using default spawn ({}, {})",
                def.name,
                DEFAULT_SPAWN.x,
                DEFAULT_SPAWN.y
            );
        }

        layout.fill_gaps();
        Ok(layout)
    }

    /// A flat, always-valid level used when a real one fails to load.
    pub fn fallback(environment: Environment) -> Self {
        const WIDTH: i32 = 40;
        const HEIGHT: i32 = 8;
        let mut layout = Self {
            name: "fallback".to_string(),
            environment,
            width: WIDTH,
            height: HEIGHT,
            cells: vec![TileCell::Empty; (WIDTH * HEIGHT) as usize],
            spawn: DEFAULT_SPAWN,
            spawn_from_marker: false,
            enemies: Vec::new(),
            items: vec![ItemSpawn {
                kind: ItemKind::LevelExit,
                position: Vec2::new((WIDTH - 4) as f32, 1.0 + EXIT_TRIGGER_LIFT),
            }],
            synthesized: Vec::new(),
        };
        for x in 0..WIDTH {
            layout.set(TileCoord::new(x, 0), TileCell::SolidGround);
        }
        layout
    }

    pub fn cell(&self, coord: TileCoord) -> TileCell {
        self.offset(coord)
            .map(|i| self.cells[i])
            .unwrap_or(TileCell::Empty)
    }

    /// Every non-empty cell with its coordinate.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, TileCell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != TileCell::Empty)
            .map(move |(i, cell)| {
                let i = i as i32;
                (TileCoord::new(i % width, i / width), *cell)
            })
    }

    fn offset(&self, coord: TileCoord) -> Option<usize> {
        if coord.x < 0 || coord.x >= self.width || coord.y < 0 || coord.y >= self.height {
            return None;
        }
        Some((coord.y * self.width + coord.x) as usize)
    }

    fn set(&mut self, coord: TileCoord, cell: TileCell) {
        if let Some(i) = self.offset(coord) {
            self.cells[i] = cell;
        }
    }

    /// Footing at `(x, y)`, counting the right half of a pipe to its left.
    fn footing_at(&self, x: i32, y: i32) -> bool {
        self.cell(TileCoord::new(x, y)).is_footing()
            || self.cell(TileCoord::new(x - 1, y)) == TileCell::Pipe
    }

    /// Close pits wider than `MAX_GAP_RUN` columns with a single stepping tile
    /// at the height of the last footing seen.
    fn fill_gaps(&mut self) {
        let mut run = 0u32;
        let mut safe_y = INITIAL_SAFE_HEIGHT;

        for x in 0..self.width {
            let topmost = (0..self.height).rev().find(|&y| self.footing_at(x, y));
            if let Some(y) = topmost {
                run = 0;
                safe_y = y;
                continue;
            }

            run += 1;
            if run <= MAX_GAP_RUN {
                continue;
            }

            let fix = TileCoord::new(x - GAP_FIX_BACKOFF as i32, safe_y);
            match self.cell(fix) {
                TileCell::Empty | TileCell::Lava if self.offset(fix).is_some() => {
                    log::warn!(
                        "Level '{}': {}-column gap ending at x={}, synthesizing ground at ({}, {})",
                        self.name,
                        run,
                        x,
                        fix.x,
                        fix.y
                    );
                    self.set(fix, TileCell::SolidGround);
                    self.synthesized.push(fix);
                    run = 0;
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(rows: &[&str]) -> LevelDef {
        LevelDef::from_rows("test", Environment::Surface, rows)
    }

    #[test]
    fn y_axis_grows_upward_from_bottom_row() {
        let layout = LevelLayout::parse(&def(&["..#", "P..", "###"])).expect("parse");
        assert_eq!(layout.cell(TileCoord::new(2, 2)), TileCell::SolidGround);
        assert_eq!(layout.cell(TileCoord::new(0, 0)), TileCell::SolidGround);
        assert_eq!(layout.cell(TileCoord::new(0, 1)), TileCell::SpawnMarker);
        assert_eq!(layout.spawn, Vec2::new(0.0, 2.0));
        assert!(layout.spawn_from_marker);
    }

    #[test]
    fn rejects_unequal_rows() {
        let err = LevelLayout::parse(&def(&["P...", "###"])).expect_err("ragged rows");
        assert!(matches!(err, LevelError::Malformed { .. }));
        assert!(err.to_string().contains("row 1 has length 3"));
    }

    #[test]
    fn rejects_unknown_marker() {
        let err = LevelLayout::parse(&def(&["P.x", "###"])).expect_err("bad marker");
        assert!(err.to_string().contains("unknown marker 'x'"));
    }

    #[test]
    fn rejects_empty_level() {
        assert!(LevelLayout::parse(&def(&[])).is_err());
    }

    #[test]
    fn missing_spawn_falls_back_to_default() {
        let layout = LevelLayout::parse(&def(&["...", "###"])).expect("parse");
        assert!(!layout.spawn_from_marker);
        assert_eq!(layout.spawn, DEFAULT_SPAWN);
    }

    #[test]
    fn markers_become_spawns() {
        let layout =
            LevelLayout::parse(&def(&["P.C.F", ".ESGK", "f####", "#####"])).expect("parse");
        let subtypes: Vec<_> = layout.enemies.iter().map(|e| e.subtype).collect();
        assert_eq!(
            subtypes,
            vec![
                EnemySubtype::Normal,
                EnemySubtype::Spiky,
                EnemySubtype::Ghoul,
                EnemySubtype::Shelled,
                EnemySubtype::Fish,
            ]
        );
        assert_eq!(layout.enemies[0].position, Vec2::new(1.0, 2.5));

        let coin = layout.items.iter().find(|i| i.kind == ItemKind::Coin).expect("coin");
        assert_eq!(coin.position, Vec2::new(2.0, 3.0));
        let exit = layout
            .items
            .iter()
            .find(|i| i.kind == ItemKind::LevelExit)
            .expect("exit");
        assert_eq!(exit.position, Vec2::new(4.0, 8.0));

        // Entity markers leave the tile itself empty.
        assert_eq!(layout.cell(TileCoord::new(1, 2)), TileCell::Empty);
    }

    #[test]
    fn wide_gap_gets_a_synthesized_tile() {
        let layout = LevelLayout::parse(&def(&[
            "P..........",
            "...........",
            "##......###",
        ]))
        .expect("parse");
        // Columns 2..=7 are empty; the fifth empty column (x=6) trips the limit.
        assert_eq!(layout.synthesized, vec![TileCoord::new(4, 0)]);
        assert_eq!(layout.cell(TileCoord::new(4, 0)), TileCell::SolidGround);
    }

    #[test]
    fn narrow_gap_is_left_alone() {
        let layout = LevelLayout::parse(&def(&["P.......", "##....##"])).expect("parse");
        assert!(layout.synthesized.is_empty());
    }

    #[test]
    fn synthesized_tile_uses_last_safe_height() {
        let layout = LevelLayout::parse(&def(&[
            "P..........",
            "###........",
            "...........",
        ]))
        .expect("parse");
        assert_eq!(layout.synthesized[0], TileCoord::new(5, 1));
    }

    #[test]
    fn lava_is_not_footing_and_can_be_covered() {
        let layout = LevelLayout::parse(&def(&["P.........", "#LLLLLL###"])).expect("parse");
        assert_eq!(layout.synthesized, vec![TileCoord::new(3, 0)]);
        assert_eq!(layout.cell(TileCoord::new(3, 0)), TileCell::SolidGround);
    }

    #[test]
    fn pipe_right_half_counts_as_footing() {
        let layout =
            LevelLayout::parse(&def(&["P.........", "#T....T.##"])).expect("parse");
        assert!(layout.synthesized.is_empty());
    }

    #[test]
    fn levels_exhausted_past_end_of_pack() {
        let pack = LevelPack::new(vec![def(&["P", "#"])]);
        assert!(pack.get(0).is_ok());
        assert_eq!(
            pack.get(1).expect_err("past the end"),
            LevelError::LevelsExhausted {
                requested: 1,
                count: 1
            }
        );
    }

    #[test]
    fn level_pack_json_defaults_environment() {
        let pack = LevelPack::from_json_str(
            r##"{ "levels": [ { "name": "a", "rows": ["P", "#"] } ] }"##,
        )
        .expect("pack should parse");
        assert_eq!(pack.levels[0].environment, Environment::Surface);

        let err = LevelPack::from_json_str(r#"{ "levels": [] }"#).expect_err("empty pack");
        assert!(err.contains("levels array is empty"));
    }

    #[test]
    fn fallback_has_floor_and_exit() {
        let layout = LevelLayout::fallback(Environment::Surface);
        assert!(layout.cell(TileCoord::new(0, 0)).is_footing());
        assert!(layout.items.iter().any(|i| i.kind == ItemKind::LevelExit));
        assert_eq!(layout.spawn, DEFAULT_SPAWN);
    }
}
