//! Patrolling enemies: weak gravity, wall reversal, stomp-or-harm contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::EnemyConfig;
use crate::spatial::{tile, Aabb, SpatialIndex};
use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemySubtype {
    Normal,
    /// Cannot be stomped.
    Spiky,
    Ghoul,
    /// Swims: ignores gravity.
    Fish,
    Shelled,
}

impl EnemySubtype {
    pub fn stompable(self) -> bool {
        self != Self::Spiky
    }

    pub fn falls(self) -> bool {
        self != Self::Fish
    }

    pub fn speed(self, config: &EnemyConfig) -> f32 {
        match self {
            Self::Ghoul => config.ghoul_speed,
            _ => config.speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyState {
    Alive,
    /// Flattened and waiting to be removed.
    Dying { remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Stomp,
    Harm,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub subtype: EnemySubtype,
    pub position: Vec2,
    pub facing: f32,
    pub speed: f32,
    pub state: EnemyState,
    pub anim_phase: f32,
    /// Visual scale; gameplay extents never change.
    pub squash: Vec2,
    retired: bool,
}

impl Enemy {
    pub fn new(id: EntityId, subtype: EnemySubtype, position: Vec2, config: &EnemyConfig) -> Self {
        Self {
            id,
            subtype,
            position,
            facing: -1.0,
            speed: subtype.speed(config),
            state: EnemyState::Alive,
            anim_phase: 0.0,
            squash: Vec2::ONE,
            retired: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive && !self.retired
    }

    /// Dying enemies whose timer ran out, and enemies retired below the map.
    pub fn is_finished(&self) -> bool {
        self.retired || matches!(self.state, EnemyState::Dying { remaining } if remaining <= 0.0)
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn aabb(&self, config: &EnemyConfig) -> Aabb {
        Aabb::new(self.position, Vec2::splat(config.half_extent))
    }

    /// One sub-step of patrol movement. No-op unless alive.
    pub fn update(&mut self, dt: f32, gravity: f32, index: &SpatialIndex, config: &EnemyConfig) {
        if !self.is_alive() {
            return;
        }

        if self.subtype.falls() {
            let foot_y = tile(self.position.y - config.foot_probe);
            if index.is_solid(tile(self.position.x), foot_y) {
                self.position.y = foot_y as f32 + config.rest_offset;
            } else {
                self.position.y += gravity * config.gravity_scale * dt;
            }
        }

        self.position.x += self.facing * self.speed * dt;
        let ahead = self.position.x + self.facing * config.wall_probe;
        if index.is_solid(tile(ahead), tile(self.position.y)) {
            self.facing = -self.facing;
        }
    }

    /// Advance the idle wobble. Dying enemies keep their flattened shape.
    pub fn animate(&mut self, dt: f32, config: &EnemyConfig) {
        if !self.is_alive() {
            return;
        }
        self.anim_phase += config.anim_rate * dt;
        let s = self.anim_phase.sin();
        self.squash = Vec2::new(1.0 - 0.05 * s, 1.0 + 0.1 * s);
    }

    /// Flatten and start the removal timer. Returns false if already dead.
    pub fn kill(&mut self, config: &EnemyConfig) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.state = EnemyState::Dying {
            remaining: config.death_delay,
        };
        self.squash = Vec2::new(1.0, 0.2);
        self.position.y -= 0.3;
        true
    }

    pub fn tick_death(&mut self, dt: f32) {
        if let EnemyState::Dying { remaining } = &mut self.state {
            *remaining = (*remaining - dt).max(0.0);
        }
    }

    /// Drop out of play without a kill (fell off the map).
    pub fn retire(&mut self) {
        self.retired = true;
    }
}

/// Classify a player/enemy overlap. `None` when the boxes do not touch or
/// the enemy is not alive.
pub fn classify_contact(
    player: &Aabb,
    player_vy: f32,
    enemy: &Enemy,
    config: &EnemyConfig,
) -> Option<Contact> {
    if !enemy.is_alive() || !player.intersects(&enemy.aabb(config)) {
        return None;
    }
    let above = player.center.y > enemy.position.y + config.stomp_height;
    if player_vy < 0.0 && above && enemy.subtype.stompable() {
        Some(Contact::Stomp)
    } else {
        Some(Contact::Harm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Environment, LevelDef, LevelLayout};

    fn index_from(rows: &[&str]) -> SpatialIndex {
        let def = LevelDef::from_rows("test", Environment::Surface, rows);
        let layout = LevelLayout::parse(&def).expect("test level should parse");
        SpatialIndex::from_layout(&layout)
    }

    fn enemy_at(subtype: EnemySubtype, x: f32, y: f32) -> Enemy {
        Enemy::new(EntityId(1), subtype, Vec2::new(x, y), &EnemyConfig::default())
    }

    #[test]
    fn ghoul_is_faster() {
        let config = EnemyConfig::default();
        assert_eq!(enemy_at(EnemySubtype::Normal, 0.0, 0.0).speed, config.speed);
        assert_eq!(enemy_at(EnemySubtype::Ghoul, 0.0, 0.0).speed, config.ghoul_speed);
    }

    #[test]
    fn falls_until_ground_then_rests_on_it() {
        let index = index_from(&["P....", ".....", ".....", "#####"]);
        let config = EnemyConfig::default();
        let mut enemy = enemy_at(EnemySubtype::Normal, 2.0, 2.5);
        for _ in 0..20 {
            enemy.update(0.01, -60.0, &index, &config);
        }
        assert!((enemy.position.y - config.rest_offset).abs() < 1e-5);
    }

    #[test]
    fn fish_ignores_gravity() {
        let index = index_from(&["P....", ".....", "#####"]);
        let config = EnemyConfig::default();
        let mut fish = enemy_at(EnemySubtype::Fish, 2.0, 2.0);
        fish.update(0.1, -60.0, &index, &config);
        assert_eq!(fish.position.y, 2.0);
    }

    #[test]
    fn reverses_at_walls() {
        let index = index_from(&["P.....", "#....#", "######"]);
        let config = EnemyConfig::default();
        let mut enemy = enemy_at(EnemySubtype::Normal, 1.5, config.rest_offset);
        assert_eq!(enemy.facing, -1.0);
        for _ in 0..20 {
            enemy.update(0.01, -60.0, &index, &config);
        }
        assert_eq!(enemy.facing, 1.0);
    }

    #[test]
    fn stomp_requires_falling_and_above() {
        let config = EnemyConfig::default();
        let enemy = enemy_at(EnemySubtype::Normal, 0.0, 0.0);
        let above = Aabb::new(Vec2::new(0.0, 0.6), Vec2::new(0.3, 0.4));
        let level = Aabb::new(Vec2::new(0.3, 0.0), Vec2::new(0.3, 0.4));

        assert_eq!(
            classify_contact(&above, -5.0, &enemy, &config),
            Some(Contact::Stomp)
        );
        assert_eq!(
            classify_contact(&above, 3.0, &enemy, &config),
            Some(Contact::Harm)
        );
        assert_eq!(
            classify_contact(&level, -5.0, &enemy, &config),
            Some(Contact::Harm)
        );
    }

    #[test]
    fn spiky_cannot_be_stomped() {
        let config = EnemyConfig::default();
        let enemy = enemy_at(EnemySubtype::Spiky, 0.0, 0.0);
        let above = Aabb::new(Vec2::new(0.0, 0.6), Vec2::new(0.3, 0.4));
        assert_eq!(
            classify_contact(&above, -5.0, &enemy, &config),
            Some(Contact::Harm)
        );
    }

    #[test]
    fn dead_enemy_has_no_contact_and_expires() {
        let config = EnemyConfig::default();
        let mut enemy = enemy_at(EnemySubtype::Normal, 0.0, 0.0);
        assert!(enemy.kill(&config));
        assert!(!enemy.kill(&config));
        assert_eq!(enemy.squash, Vec2::new(1.0, 0.2));

        let touching = Aabb::new(Vec2::ZERO, Vec2::new(0.3, 0.4));
        assert_eq!(classify_contact(&touching, -5.0, &enemy, &config), None);

        enemy.tick_death(0.3);
        assert!(!enemy.is_finished());
        enemy.tick_death(0.3);
        assert!(enemy.is_finished());
    }

    #[test]
    fn idle_squash_oscillates() {
        let config = EnemyConfig::default();
        let mut enemy = enemy_at(EnemySubtype::Normal, 0.0, 0.0);
        enemy.animate(0.05, &config);
        assert!(enemy.squash.y > 1.0);
        assert!(enemy.squash.x < 1.0);
    }
}
