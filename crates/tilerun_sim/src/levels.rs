//! Levels bundled with the engine.
//!
//! `?` blocks hold a coin and `!` blocks a power-up; in each map every third
//! question block holds the power-up. The first two levels carry no spawn
//! marker and start from the default spawn.

use crate::level::{Environment, LevelDef, LevelPack};

const PLAIN_AND_SIMPLE: &[&str] = &[
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".............................................................................................................................................................................................................C..C.............................................F........",
    ".....................................................................................?......................................................................?......S......!................................###..###...........................................###......",
    "...........................................?......?.................................###...................................................................#####..#####..#####......................T.........###..###.........T...................K...........#####....",
    "..............!.................?.........###....###.......................T.......#####......T.......................?......T...........T.................#####..#####..#####.......T.............###........###..###........###.........T.......###..........#######.",
    ".............###...............###.......#####..#####.....................###.....#######....###.....................###....###.........###................#####..#####..#####......###...........#####.......###..###.......#####.......###......#####.........#######",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    "#######################################################################################################################################################################################################################################################################",
];

const UNDERGROUND_CASTLE: &[&str] = &[
    "############################################################################################################################################################################################################################################################################################################",
    "############################################################################################################################################################################################################################################################################################################",
    "................................................................................................................................................................................................................................................................................................############",
    "................................................................................................................................................................................................................................................................................................############",
    "................................................................................................................................................................................................................................................................................................############",
    "..........................?.................................................................................................................................................................................................................................................................................",
    ".........................###................................................S...................................................................................................S...........................................................................................................................",
    "...........................................................................###.................................................................................................###..........................................................................................................................",
    "..........................................?......!........................#####...............................................................................................#####.........................................................................................................................",
    "...........S.............................###....###......................#######..................................###.........###...................###......................#######.............................................................................................................F..........",
    "..........###...........S...............................................#########...........###.............................................................................#########..........................................................................................................###..........",
    ".......................###....................................................................................................................................................................................................................................................................#####.........",
    "####...#########...#########...#L#...#######...################...#########...#########...#########...#########...#########...#########...####L#L#L####...#########...#####...#####...#####...#########...#########...#########...###L#L#L###...#########...#########...#########...#########...#########...",
];

const HAUNTED_PEAKS: &[&str] = &[
    ".......................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................",
    ".......................................................................................C.C.C...........................................................................................................................................",
    ".......................................................................................#####...........................................................................................................................................",
    "...........................................G...........?..............................#######.................................................................................................................................F........",
    "........................G...............#######.......###................G...........#########..........G.......................G.......................G.......................G.............................................#........",
    "P......................###.............#########.....#####..............###.........###########........###.....................###.....................###.....................###.....................###....................#........",
    "#####....###..........#####.....###...###########...#######....###.....#####.......#############......#####......###..........#####......###..........#####......###..........#####......###..........#####......###..........#........",
];

const THE_DEEP_BLUE: &[&str] = &[
    "#######################################################################################################################################################################################################################################################################",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    "......................................f...........................f.........................f..........................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................f..........................f...........................f....................................................f................................f..................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    "P..............................###...........................................................................###..............................................................................................................................................F........",
    "####..........................#####.......................###...............................................#####.......................###............................................................................................................................",
    ".........................................................#####...................f.....................................................#####...................f.......................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    "#######################################################################################################################################################################################################################################################################",
];

const SHELL_CAVE: &[&str] = &[
    "#######################################################################################################################################################################################################################################################################",
    "#######################################################################################################################################################################################################################################################################",
    "#######################################################################################################################################################################################################################################################################",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    ".......................................................................................................................................................................................................................................................................",
    "..........................K............................................................................................................................................................................................................................................",
    ".........................###................................................K...................................................................................................K.............................................................................F........",
    "...........................................................................###.................................................................................................###............................................................................###......",
    "..........................................?......?........................#####...............................................................................................#####..........................................................................#####.....",
    "P..........K.............................###....###......................#######..................................###.........###...................###......................#######........................................................................#######....",
    "###.......###...........K...............................................#########...........###.............................................................................#########..................................................................................",
    ".......................###.............................................................................................................................................................................................................................................",
    "#####...#########...#########...#L#L#.......#######...################...#########...#########...#########...#########...#########...#########...####LL#L#LL####...#########...#####...#####...#####...#########...#########...#########...###L#L#L###...#########...##",
];

impl LevelPack {
    /// The five stock levels, in play order.
    pub fn builtin() -> Self {
        let levels = vec![
            LevelDef::from_rows("Plain & Simple", Environment::Surface, PLAIN_AND_SIMPLE),
            LevelDef::from_rows("Underground Castle", Environment::Surface, UNDERGROUND_CASTLE),
            LevelDef::from_rows("The Haunted Peaks", Environment::Surface, HAUNTED_PEAKS),
            LevelDef::from_rows("The Deep Blue", Environment::Underwater, THE_DEEP_BLUE),
            LevelDef::from_rows("Shell Cave", Environment::Surface, SHELL_CAVE),
        ];
        Self { levels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemySubtype;
    use crate::items::ItemKind;
    use crate::level::{LevelLayout, TileCell, DEFAULT_SPAWN};
    use crate::spatial::TileCoord;

    fn layouts() -> Vec<LevelLayout> {
        LevelPack::builtin()
            .levels
            .iter()
            .map(|def| LevelLayout::parse(def).expect("builtin level should parse"))
            .collect()
    }

    #[test]
    fn every_builtin_level_parses_with_an_exit() {
        let layouts = layouts();
        assert_eq!(layouts.len(), 5);
        for layout in &layouts {
            assert!(
                layout.items.iter().any(|item| item.kind == ItemKind::LevelExit),
                "{} has no exit",
                layout.name
            );
        }
    }

    #[test]
    fn first_two_levels_use_the_default_spawn() {
        let layouts = layouts();
        for layout in &layouts[..2] {
            assert!(!layout.spawn_from_marker, "{}", layout.name);
            assert_eq!(layout.spawn, DEFAULT_SPAWN);
        }
        assert!(layouts[2..].iter().all(|layout| layout.spawn_from_marker));
    }

    #[test]
    fn only_the_haunted_peaks_needs_gap_fixes() {
        let layouts = layouts();
        for (i, layout) in layouts.iter().enumerate() {
            if i == 2 {
                assert_eq!(layout.synthesized.len(), 22);
                assert_eq!(layout.synthesized.first(), Some(&TileCoord::new(14, 0)));
                assert_eq!(layout.synthesized.last(), Some(&TileCoord::new(225, 2)));
            } else {
                assert!(
                    layout.synthesized.is_empty(),
                    "{} needed gap fixes at {:?}",
                    layout.name,
                    layout.synthesized
                );
            }
        }
    }

    #[test]
    fn castle_floor_has_lava_pits() {
        let castle = &layouts()[1];
        assert_eq!(castle.cell(TileCoord::new(32, 0)), TileCell::Lava);
        assert_eq!(castle.cell(TileCoord::new(142, 0)), TileCell::Lava);
        assert_eq!(castle.cell(TileCoord::new(143, 0)), TileCell::SolidGround);
    }

    #[test]
    fn deep_blue_is_a_fish_field() {
        let deep = &layouts()[3];
        assert_eq!(deep.enemies.len(), 10);
        assert!(deep
            .enemies
            .iter()
            .all(|spawn| spawn.subtype == EnemySubtype::Fish));
    }

    #[test]
    fn only_the_deep_blue_is_submerged() {
        let pack = LevelPack::builtin();
        let submerged: Vec<_> = pack
            .levels
            .iter()
            .filter(|def| def.environment == Environment::Underwater)
            .map(|def| def.name.as_str())
            .collect();
        assert_eq!(submerged, vec!["The Deep Blue"]);
    }
}
