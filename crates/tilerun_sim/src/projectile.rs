//! Fireballs: a small capped pool of bouncing projectiles.

use glam::Vec2;

use crate::config::{EnemyConfig, ProjectileConfig};
use crate::enemy::Enemy;
use crate::spatial::{tile, Aabb, SpatialIndex};
use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub active: bool,
}

impl Projectile {
    pub fn aabb(&self, config: &ProjectileConfig) -> Aabb {
        Aabb::new(self.position, Vec2::splat(config.half_extent))
    }

    /// One sub-step. Returns the index of an enemy this projectile killed.
    fn step(
        &mut self,
        dt: f32,
        index: &SpatialIndex,
        enemies: &mut [Enemy],
        config: &ProjectileConfig,
        enemy_config: &EnemyConfig,
        kill_plane: f32,
    ) -> Option<usize> {
        if !self.active {
            return None;
        }

        self.velocity.y += config.gravity * dt;
        self.position += self.velocity * dt;

        if self.position.y < kill_plane {
            self.active = false;
            return None;
        }

        let (x, y) = (self.position.x, self.position.y);
        if index.is_solid(tile(x), tile(y - config.floor_probe)) {
            self.velocity.y = config.bounce_speed;
        }
        let ahead = if self.velocity.x > 0.0 {
            config.wall_probe
        } else {
            -config.wall_probe
        };
        if index.is_solid(tile(x + ahead), tile(y)) {
            self.active = false;
            return None;
        }

        let bounds = self.aabb(config);
        let hit = enemies
            .iter()
            .position(|enemy| enemy.is_alive() && bounds.intersects(&enemy.aabb(enemy_config)))?;
        enemies[hit].kill(enemy_config);
        self.active = false;
        Some(hit)
    }
}

/// What happened to the pool during one sub-step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectileReport {
    /// Indices into the enemy slice passed to `update`.
    pub kills: Vec<usize>,
    pub removed: Vec<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectileSystem {
    projectiles: Vec<Projectile>,
}

impl ProjectileSystem {
    pub fn active_count(&self) -> usize {
        self.projectiles.iter().filter(|p| p.active).count()
    }

    pub fn has_capacity(&self, config: &ProjectileConfig) -> bool {
        self.active_count() < config.max_active
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    /// Launch from `origin` in the direction of `facing`. Refused at the cap.
    pub fn spawn(
        &mut self,
        id: EntityId,
        origin: Vec2,
        facing: f32,
        config: &ProjectileConfig,
    ) -> Option<EntityId> {
        if !self.has_capacity(config) {
            log::debug!("Fireball refused: {} already active", self.active_count());
            return None;
        }
        self.projectiles.push(Projectile {
            id,
            position: origin,
            velocity: Vec2::new(facing.signum() * config.speed, config.launch_vy),
            active: true,
        });
        Some(id)
    }

    pub fn update(
        &mut self,
        dt: f32,
        index: &SpatialIndex,
        enemies: &mut [Enemy],
        config: &ProjectileConfig,
        enemy_config: &EnemyConfig,
        kill_plane: f32,
    ) -> ProjectileReport {
        let mut report = ProjectileReport::default();
        for projectile in &mut self.projectiles {
            if let Some(hit) = projectile.step(dt, index, enemies, config, enemy_config, kill_plane)
            {
                report.kills.push(hit);
            }
        }
        self.projectiles.retain(|p| {
            if !p.active {
                report.removed.push(p.id);
            }
            p.active
        });
        report
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }
}
