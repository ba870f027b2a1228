//! The frame loop: one `tick` per rendered frame, sub-stepped internally.

use glam::Vec2;

use tilerun_core::input::{Action, InputState};
use tilerun_core::time::TimeState;

use crate::config::{Environmental, SimConfig};
use crate::enemy::{classify_contact, Contact, Enemy};
use crate::error::LevelError;
use crate::events::{DeathCause, EventQueue, SimEvent};
use crate::items::{first_overlap, Item, ItemKind};
use crate::level::{BlockContent, Environment, LevelLayout, LevelPack};
use crate::physics::{self, apply_jump_edges, Controls, PlayerBody};
use crate::progression::{DeathOutcome, LevelAdvance, Phase, ProgressionState};
use crate::projectile::ProjectileSystem;
use crate::snapshot::{EnemyView, ItemView, PlayerView, ProjectileView, Snapshot};
use crate::spatial::{SpatialIndex, TileCoord};
use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Died,
    LevelEnded,
}

pub struct Simulation {
    config: SimConfig,
    pack: LevelPack,
    time: TimeState,
    layout: LevelLayout,
    index: SpatialIndex,
    env: Environmental,
    player: PlayerBody,
    enemies: Vec<Enemy>,
    items: Vec<Item>,
    projectiles: ProjectileSystem,
    progression: ProgressionState,
    events: EventQueue,
    next_id: u32,
}

impl Simulation {
    /// Build a simulation and load the first level of `pack`.
    pub fn new(pack: LevelPack, config: SimConfig) -> Result<Self, LevelError> {
        if pack.is_empty() {
            return Err(LevelError::LevelsExhausted {
                requested: 0,
                count: 0,
            });
        }
        let layout = LevelLayout::fallback(Environment::Surface);
        let env = config.environmental(layout.environment);
        let mut sim = Self {
            player: PlayerBody::new(layout.spawn, &config.physics, &env),
            index: SpatialIndex::from_layout(&layout),
            layout,
            env,
            config,
            pack,
            time: TimeState::new(),
            enemies: Vec::new(),
            items: Vec::new(),
            projectiles: ProjectileSystem::default(),
            progression: ProgressionState::new(config.progression),
            events: EventQueue::default(),
            next_id: 1,
        };
        sim.load_level(0)?;
        Ok(sim)
    }

    pub fn phase(&self) -> Phase {
        self.progression.phase()
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn player(&self) -> &PlayerBody {
        &self.player
    }

    /// Direct access for hosts that teleport the player (debug tools, tests).
    pub fn player_mut(&mut self) -> &mut PlayerBody {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn time(&self) -> &TimeState {
        &self.time
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Advance one frame. Nothing moves outside `Phase::Playing`.
    pub fn tick(&mut self, input: &InputState, raw_dt: f32) {
        let dt = self.time.begin_frame(raw_dt);
        if self.progression.phase() != Phase::Playing {
            return;
        }

        apply_jump_edges(
            &mut self.player,
            input.is_just_pressed(Action::Jump),
            input.is_just_released(Action::Jump),
            &self.config.physics,
            &self.env,
        );
        if input.is_just_pressed(Action::Shoot) {
            self.shoot();
        }

        let controls = Controls {
            move_x: input.move_axis(),
            run: input.is_held(Action::Run),
        };

        let mut flow = Flow::Continue;
        for step_dt in self.time.substeps() {
            self.time.record_step(step_dt);
            flow = self.substep(step_dt, controls);
            if flow != Flow::Continue {
                break;
            }
        }

        if flow == Flow::Continue && self.player.position.y < self.config.physics.kill_plane {
            self.die(DeathCause::Fell);
        }

        self.advance_enemy_timers(dt);

        if flow != Flow::LevelEnded
            && self.progression.phase() == Phase::Playing
            && self.progression.tick_timer(dt, &mut self.events)
        {
            self.die(DeathCause::TimeUp);
        }
    }

    /// Start over from the first level. Valid in any phase.
    pub fn restart(&mut self) {
        log::info!("Restarting from level 0");
        self.progression.restart(&mut self.events);
        if let Err(e) = self.load_level(0) {
            log::error!("Restart failed: {e}");
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let p = &self.player;
        Snapshot {
            level_index: self.progression.level_index,
            level_name: self.layout.name.clone(),
            phase: self.progression.phase(),
            lives: self.progression.lives,
            score: self.progression.score,
            time_remaining: self.progression.time_remaining,
            player: PlayerView {
                position: p.position.to_array(),
                velocity: p.velocity.to_array(),
                facing: p.facing,
                grounded: p.grounded,
                fire_power: self.progression.fire_power,
            },
            enemies: self
                .enemies
                .iter()
                .filter(|e| !e.is_retired())
                .map(|e| EnemyView {
                    id: e.id,
                    subtype: e.subtype,
                    position: e.position.to_array(),
                    facing: e.facing,
                    squash: e.squash.to_array(),
                    dying: !e.is_alive(),
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .filter(|p| p.active)
                .map(|p| ProjectileView {
                    id: p.id,
                    position: p.position.to_array(),
                })
                .collect(),
            items: self
                .items
                .iter()
                .map(|i| ItemView {
                    id: i.id,
                    kind: i.kind,
                    position: i.position.to_array(),
                })
                .collect(),
        }
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        let def = self.pack.get(index)?;
        let layout = match LevelLayout::parse(def) {
            Ok(layout) => layout,
            Err(e) => {
                log::error!("{e}; loading the fallback level instead");
                LevelLayout::fallback(def.environment)
            }
        };

        self.env = self.config.environmental(layout.environment);
        self.index = SpatialIndex::from_layout(&layout);
        self.player.reset_at(layout.spawn, &self.env);
        self.projectiles.clear();

        self.enemies.clear();
        for spawn in &layout.enemies {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            self.enemies
                .push(Enemy::new(id, spawn.subtype, spawn.position, &self.config.enemy));
        }
        self.items.clear();
        for spawn in &layout.items {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            self.items.push(Item::new(id, spawn.kind, spawn.position));
        }

        if let Err(e) = self
            .progression
            .begin_level(index, layout.spawn, &mut self.events)
        {
            log::warn!("{e}");
        }
        log::info!(
            "Loaded level {index} '{}' ({}x{}, {:?}, {} enemies, {} items)",
            layout.name,
            layout.width,
            layout.height,
            layout.environment,
            self.enemies.len(),
            self.items.len()
        );
        self.events.push(SimEvent::LevelChanged {
            index,
            name: layout.name.clone(),
        });
        self.layout = layout;
        Ok(())
    }

    fn substep(&mut self, dt: f32, controls: Controls) -> Flow {
        let outcome = physics::step(
            &mut self.player,
            controls,
            dt,
            &self.index,
            &self.config.physics,
            &self.env,
        );
        if outcome.hazard.is_some() {
            self.die(DeathCause::Hazard);
            return Flow::Died;
        }
        for coord in outcome.ceiling_hits {
            self.bump(coord);
        }
        if let Some(coord) = outcome.landed_on {
            self.progression
                .record_ground(coord, self.player.position.x);
        }

        let kill_plane = self.config.physics.kill_plane;
        for enemy in &mut self.enemies {
            enemy.update(dt, self.env.gravity, &self.index, &self.config.enemy);
            if enemy.is_alive() && enemy.position.y < kill_plane {
                log::debug!("Enemy {:?} fell out of the level", enemy.id);
                enemy.retire();
            }
        }

        let report = self.projectiles.update(
            dt,
            &self.index,
            &mut self.enemies,
            &self.config.projectile,
            &self.config.enemy,
            kill_plane,
        );
        for hit in report.kills {
            self.award_kill(hit);
        }
        for id in report.removed {
            self.events.push(SimEvent::ProjectileRemoved { id });
        }

        match self.resolve_contacts() {
            Flow::Continue => self.collect_items(),
            flow => flow,
        }
    }

    fn shoot(&mut self) {
        if !self.progression.fire_power {
            return;
        }
        if !self.projectiles.has_capacity(&self.config.projectile) {
            log::debug!("Fireball cap reached");
            return;
        }
        let id = self.alloc_id();
        if let Some(id) = self.projectiles.spawn(
            id,
            self.player.position,
            self.player.facing,
            &self.config.projectile,
        ) {
            self.events.push(SimEvent::ProjectileSpawned { id });
        }
    }

    fn bump(&mut self, coord: TileCoord) {
        let Some(hit) = self.index.activate(coord) else {
            return;
        };
        self.events.push(SimEvent::BlockBumped { coord });
        let above = coord.center() + Vec2::Y;
        match hit.reward {
            Some(BlockContent::Coin) => {
                let amount = self.config.progression.block_coin_score;
                self.progression.add_score(amount, &mut self.events);
                self.events.push(SimEvent::score_popup(above, amount));
            }
            Some(BlockContent::PowerUp) => {
                let id = self.alloc_id();
                self.items.push(Item::new(id, ItemKind::PowerUp, above));
                self.events.push(SimEvent::ItemSpawned {
                    id,
                    kind: ItemKind::PowerUp,
                });
            }
            None => {}
        }
    }

    fn award_kill(&mut self, enemy_index: usize) {
        let Some(enemy) = self.enemies.get(enemy_index).copied() else {
            return;
        };
        log::debug!("Enemy {:?} ({:?}) killed", enemy.id, enemy.subtype);
        let amount = self.config.progression.enemy_score;
        self.progression.add_score(amount, &mut self.events);
        self.events.push(SimEvent::EnemyKilled {
            id: enemy.id,
            subtype: enemy.subtype,
        });
        self.events
            .push(SimEvent::score_popup(enemy.position + Vec2::Y, amount));
    }

    /// Player against every live enemy: stomp them or get hurt.
    fn resolve_contacts(&mut self) -> Flow {
        for i in 0..self.enemies.len() {
            let player = self.player.aabb();
            let contact = classify_contact(
                &player,
                self.player.velocity.y,
                &self.enemies[i],
                &self.config.enemy,
            );
            match contact {
                None => {}
                Some(Contact::Stomp) => {
                    self.enemies[i].kill(&self.config.enemy);
                    self.player.velocity.y = self.config.enemy.stomp_bounce;
                    self.award_kill(i);
                }
                Some(Contact::Harm) => {
                    self.die(DeathCause::Enemy);
                    return Flow::Died;
                }
            }
        }
        Flow::Continue
    }

    fn collect_items(&mut self) -> Flow {
        while let Some(i) = first_overlap(&self.items, &self.player.aabb()) {
            if self.items[i].kind == ItemKind::LevelExit {
                self.finish_level();
                return Flow::LevelEnded;
            }
            let item = self.items.remove(i);
            self.progression.collect(item.kind, &mut self.events);
            self.events.push(SimEvent::ItemCollected {
                id: item.id,
                kind: item.kind,
            });
        }
        Flow::Continue
    }

    fn finish_level(&mut self) {
        match self.progression.complete_level(self.pack.len(), &mut self.events) {
            Ok(LevelAdvance::Next(next)) => {
                if let Err(e) = self.load_level(next) {
                    log::error!("{e}");
                }
            }
            Ok(LevelAdvance::Victory) => {
                log::info!("All levels cleared with score {}", self.progression.score);
            }
            Err(e) => log::debug!("{e}"),
        }
    }

    fn die(&mut self, cause: DeathCause) {
        match self.progression.on_death(
            &mut self.player,
            cause,
            self.layout.spawn,
            &self.env,
            &mut self.events,
        ) {
            Ok(DeathOutcome::Respawned(_)) => {}
            Ok(DeathOutcome::GameOver) => {
                log::info!("Game over with score {}", self.progression.score);
            }
            Err(e) => log::debug!("Death ignored: {e}"),
        }
    }

    fn advance_enemy_timers(&mut self, dt: f32) {
        for enemy in &mut self.enemies {
            enemy.tick_death(dt);
            enemy.animate(dt, &self.config.enemy);
        }
        let events = &mut self.events;
        self.enemies.retain(|enemy| {
            if !enemy.is_finished() {
                return true;
            }
            if !enemy.is_retired() {
                events.push(SimEvent::EnemyRemoved { id: enemy.id });
            }
            false
        });
    }
}
