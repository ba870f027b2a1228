//! Tunable constants for the simulation.
//!
//! Every field has a default so a JSON override file only needs to name the
//! values it changes.

use serde::{Deserialize, Serialize};

use crate::level::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub move_speed: f32,
    pub run_multiplier: f32,
    /// Interpolation rate (per second) toward the target horizontal speed.
    pub accel_rate: f32,
    /// Per-1/60s velocity retention when no direction is held.
    pub friction_ground: f32,
    pub friction_air: f32,
    pub stop_threshold: f32,
    pub jump_speed: f32,
    pub jump_cut: f32,
    pub half_width: f32,
    pub half_height: f32,
    /// Heights (relative to the body centre) probed for horizontal hits.
    pub wall_probe_high: f32,
    pub wall_probe_low: f32,
    /// Horizontal inset of the vertical probes.
    pub edge_inset: f32,
    pub wall_margin: f32,
    pub floor_margin: f32,
    pub ground_skin: f32,
    pub kill_plane: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -60.0,
            max_fall_speed: 50.0,
            move_speed: 9.0,
            run_multiplier: 1.5,
            accel_rate: 10.0,
            friction_ground: 0.8,
            friction_air: 0.95,
            stop_threshold: 0.1,
            jump_speed: 26.0,
            jump_cut: 0.5,
            half_width: 0.3,
            half_height: 0.4,
            wall_probe_high: 0.3,
            wall_probe_low: 0.0,
            edge_inset: 0.1,
            wall_margin: 0.001,
            floor_margin: 0.001,
            ground_skin: 0.02,
            kill_plane: -5.0,
        }
    }
}

/// Values swapped in while the current level is submerged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderwaterConfig {
    pub gravity: f32,
    pub friction_air: f32,
}

impl Default for UnderwaterConfig {
    fn default() -> Self {
        Self {
            gravity: -10.0,
            friction_air: 0.98,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    pub ghoul_speed: f32,
    pub half_extent: f32,
    /// Fraction of world gravity applied as a constant fall rate.
    pub gravity_scale: f32,
    pub foot_probe: f32,
    pub rest_offset: f32,
    pub wall_probe: f32,
    pub stomp_height: f32,
    pub stomp_bounce: f32,
    pub death_delay: f32,
    pub anim_rate: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 2.5,
            ghoul_speed: 4.0,
            half_extent: 0.4,
            gravity_scale: 0.5,
            foot_probe: 0.6,
            rest_offset: 0.9,
            wall_probe: 0.6,
            stomp_height: 0.3,
            stomp_bounce: 15.0,
            death_delay: 0.5,
            anim_rate: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub max_active: usize,
    pub speed: f32,
    pub launch_vy: f32,
    pub gravity: f32,
    pub bounce_speed: f32,
    pub floor_probe: f32,
    pub wall_probe: f32,
    pub half_extent: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            max_active: 3,
            speed: 12.0,
            launch_vy: -2.0,
            gravity: -60.0,
            bounce_speed: 10.0,
            floor_probe: 0.2,
            wall_probe: 0.3,
            half_extent: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub starting_lives: u32,
    pub level_time: f32,
    pub coin_score: u64,
    pub block_coin_score: u64,
    pub enemy_score: u64,
    /// Below this height a death counts as a pit fall.
    pub pit_threshold: f32,
    pub bounce_back_x: f32,
    pub bounce_back_y: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            starting_lives: 10,
            level_time: 400.0,
            coin_score: 50,
            block_coin_score: 100,
            enemy_score: 200,
            pit_threshold: -2.0,
            bounce_back_x: 2.0,
            bounce_back_y: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub underwater: UnderwaterConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub progression: ProgressionConfig,
}

/// The per-level gravity and air friction after environment overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environmental {
    pub gravity: f32,
    pub friction_air: f32,
    pub swimming: bool,
}

impl SimConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let config: SimConfig = serde_json::from_str(raw)
            .map_err(|e| format!("Failed to parse simulation config JSON: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let p = &self.physics;
        if p.gravity >= 0.0 || self.underwater.gravity >= 0.0 {
            return Err("Config validation failed: gravity must be negative".to_string());
        }
        if p.half_width <= 0.0 || p.half_height <= 0.0 {
            return Err("Config validation failed: player extents must be > 0".to_string());
        }
        // Vertical probes must stay inside the body.
        if p.edge_inset >= p.half_width {
            return Err("Config validation failed: edge_inset too large for body".to_string());
        }
        for (name, value) in [
            ("friction_ground", p.friction_ground),
            ("friction_air", p.friction_air),
            ("underwater.friction_air", self.underwater.friction_air),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!(
                    "Config validation failed: {name} must be within [0, 1], got {value}"
                ));
            }
        }
        if p.max_fall_speed <= 0.0 {
            return Err("Config validation failed: max_fall_speed must be > 0".to_string());
        }
        if self.projectile.max_active == 0 {
            log::warn!("Projectile cap is 0; fireballs are disabled.");
        }
        if self.progression.starting_lives == 0 {
            return Err("Config validation failed: starting_lives must be > 0".to_string());
        }
        if self.progression.level_time <= 0.0 {
            return Err("Config validation failed: level_time must be > 0".to_string());
        }
        if self.enemy.death_delay < 0.0 {
            return Err("Config validation failed: death_delay must be >= 0".to_string());
        }
        Ok(())
    }

    pub fn environmental(&self, environment: Environment) -> Environmental {
        match environment {
            Environment::Surface => Environmental {
                gravity: self.physics.gravity,
                friction_air: self.physics.friction_air,
                swimming: false,
            },
            Environment::Underwater => Environmental {
                gravity: self.underwater.gravity,
                friction_air: self.underwater.friction_air,
                swimming: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = SimConfig::from_json_str(r#"{ "physics": { "jump_speed": 30.0 } }"#)
            .expect("partial config should parse");
        assert_eq!(config.physics.jump_speed, 30.0);
        assert_eq!(config.physics.gravity, -60.0);
        assert_eq!(config.projectile.max_active, 3);
    }

    #[test]
    fn rejects_positive_gravity() {
        let err = SimConfig::from_json_str(r#"{ "physics": { "gravity": 5.0 } }"#)
            .expect_err("upward gravity should fail");
        assert!(err.contains("gravity must be negative"));
    }

    #[test]
    fn rejects_friction_out_of_range() {
        let err = SimConfig::from_json_str(r#"{ "physics": { "friction_air": 1.5 } }"#)
            .expect_err("friction above 1 should fail");
        assert!(err.contains("friction_air"));
    }

    #[test]
    fn underwater_overrides_gravity_and_enables_swimming() {
        let config = SimConfig::default();
        let surface = config.environmental(Environment::Surface);
        let water = config.environmental(Environment::Underwater);
        assert_eq!(surface.gravity, -60.0);
        assert!(!surface.swimming);
        assert_eq!(water.gravity, -10.0);
        assert_eq!(water.friction_air, 0.98);
        assert!(water.swimming);
    }
}
