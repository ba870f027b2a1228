//! Player body integration against the tile grid.
//!
//! Each sub-step applies gravity and horizontal control, then moves and
//! resolves X before Y. Resolution probes a handful of points on the body
//! edge against the spatial index. The body is narrower than a tile and a
//! sub-step moves it at most half a tile, so a probe can never skip a solid.

use glam::Vec2;

use crate::config::{Environmental, PhysicsConfig};
use crate::spatial::{tile, Aabb, SpatialIndex, TileCoord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub grounded: bool,
    pub can_jump: bool,
    /// +1 facing right, -1 facing left.
    pub facing: f32,
    pub submerged: bool,
}

impl PlayerBody {
    pub fn new(position: Vec2, config: &PhysicsConfig, env: &Environmental) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            half_extents: Vec2::new(config.half_width, config.half_height),
            grounded: false,
            can_jump: env.swimming,
            facing: 1.0,
            submerged: env.swimming,
        }
    }

    /// Place at `position` with all motion cancelled.
    pub fn reset_at(&mut self, position: Vec2, env: &Environmental) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.grounded = false;
        self.can_jump = env.swimming;
        self.submerged = env.swimming;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.half_extents)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    /// -1, 0 or 1.
    pub move_x: f32,
    pub run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Distinct tiles the head struck while rising.
    pub ceiling_hits: Vec<TileCoord>,
    pub landed_on: Option<TileCoord>,
    pub hazard: Option<TileCoord>,
}

/// Tick-level jump edges. Runs once per frame before the sub-steps.
pub fn apply_jump_edges(
    body: &mut PlayerBody,
    pressed: bool,
    released: bool,
    config: &PhysicsConfig,
    env: &Environmental,
) {
    if pressed && body.can_jump {
        body.velocity.y = config.jump_speed;
        body.grounded = false;
        if !env.swimming {
            body.can_jump = false;
        }
    }
    if released && body.velocity.y > 0.0 {
        body.velocity.y *= config.jump_cut;
    }
}

pub fn step(
    body: &mut PlayerBody,
    controls: Controls,
    dt: f32,
    index: &SpatialIndex,
    config: &PhysicsConfig,
    env: &Environmental,
) -> StepOutcome {
    body.velocity.y = (body.velocity.y + env.gravity * dt).max(-config.max_fall_speed);
    apply_horizontal(body, controls, dt, config, env);

    body.position.x += body.velocity.x * dt;
    resolve_x(body, index, config);

    body.position.y += body.velocity.y * dt;
    resolve_y(body, index, config)
}

fn apply_horizontal(
    body: &mut PlayerBody,
    controls: Controls,
    dt: f32,
    config: &PhysicsConfig,
    env: &Environmental,
) {
    if controls.move_x != 0.0 {
        let speed = if controls.run {
            config.move_speed * config.run_multiplier
        } else {
            config.move_speed
        };
        let target = controls.move_x.signum() * speed;
        let t = (config.accel_rate * dt).min(1.0);
        body.velocity.x += (target - body.velocity.x) * t;
        body.facing = controls.move_x.signum();
        return;
    }

    let friction = if body.grounded {
        config.friction_ground
    } else {
        env.friction_air
    };
    // Friction constants are tuned per 60 Hz frame.
    body.velocity.x *= friction.powf(60.0 * dt);
    if body.velocity.x.abs() < config.stop_threshold {
        body.velocity.x = 0.0;
    }
}

fn resolve_x(body: &mut PlayerBody, index: &SpatialIndex, config: &PhysicsConfig) {
    let vx = body.velocity.x;
    if vx == 0.0 {
        return;
    }
    let dir = vx.signum();
    let half_w = body.half_extents.x;
    let lead = tile(body.position.x + dir * half_w);

    let blocked = [config.wall_probe_high, config.wall_probe_low]
        .iter()
        .any(|offset| index.is_solid(lead, tile(body.position.y + offset)));
    if !blocked {
        return;
    }

    let face = lead as f32 - dir * 0.5;
    body.position.x = face - dir * (half_w + config.wall_margin);
    body.velocity.x = 0.0;
}

fn resolve_y(body: &mut PlayerBody, index: &SpatialIndex, config: &PhysicsConfig) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    body.grounded = false;

    let reach = body.half_extents.x - config.edge_inset;
    let columns = [
        tile(body.position.x - reach),
        tile(body.position.x + reach),
    ];
    let half_h = body.half_extents.y;

    if body.velocity.y > 0.0 {
        let row = tile(body.position.y + half_h);
        for tx in columns {
            let coord = TileCoord::new(tx, row);
            if index.is_solid(tx, row) && !outcome.ceiling_hits.contains(&coord) {
                outcome.ceiling_hits.push(coord);
            }
        }
        if !outcome.ceiling_hits.is_empty() {
            body.position.y = row as f32 - 0.5 - half_h - config.floor_margin;
            body.velocity.y = 0.0;
        }
        return outcome;
    }

    let row = tile(body.position.y - half_h - config.ground_skin);
    let Some(tx) = columns.into_iter().find(|&tx| index.is_solid(tx, row)) else {
        return outcome;
    };

    if let Some(lava) = columns.into_iter().find(|&tx| index.is_hazard(tx, row)) {
        outcome.hazard = Some(TileCoord::new(lava, row));
        return outcome;
    }

    body.position.y = row as f32 + 0.5 + half_h + config.floor_margin;
    body.velocity.y = 0.0;
    body.grounded = true;
    body.can_jump = true;
    outcome.landed_on = Some(TileCoord::new(tx, row));
    outcome
}
