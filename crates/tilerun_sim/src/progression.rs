//! Lives, score, timer, checkpoints and the phase machine around them.

use glam::Vec2;
use serde::Serialize;

use crate::config::{Environmental, ProgressionConfig};
use crate::error::ProgressionError;
use crate::events::{DeathCause, EventQueue, SimEvent};
use crate::items::ItemKind;
use crate::physics::PlayerBody;
use crate::spatial::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    Dying,
    Respawning,
    LevelComplete,
    GameOver,
    Victory,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }

    fn allows(self, to: Phase) -> bool {
        matches!(
            (self, to),
            (Self::Playing, Self::Dying)
                | (Self::Dying, Self::Respawning)
                | (Self::Dying, Self::GameOver)
                | (Self::Respawning, Self::Playing)
                | (Self::Playing, Self::LevelComplete)
                | (Self::LevelComplete, Self::Playing)
                | (Self::LevelComplete, Self::Victory)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeathOutcome {
    Respawned(Vec2),
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelAdvance {
    Next(usize),
    Victory,
}

#[derive(Debug, Clone)]
pub struct ProgressionState {
    pub lives: u32,
    pub score: u64,
    pub time_remaining: f32,
    pub level_index: usize,
    pub checkpoint_x: f32,
    pub last_safe: Option<TileCoord>,
    pub fire_power: bool,
    phase: Phase,
    shown_seconds: u32,
    config: ProgressionConfig,
}

impl ProgressionState {
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            lives: config.starting_lives,
            score: 0,
            time_remaining: config.level_time,
            level_index: 0,
            checkpoint_x: 0.0,
            last_safe: None,
            fire_power: false,
            phase: Phase::Playing,
            shown_seconds: displayed_seconds(config.level_time),
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transition(&mut self, to: Phase, events: &mut EventQueue) -> Result<(), ProgressionError> {
        let from = self.phase;
        if !from.allows(to) {
            return Err(ProgressionError::InvalidTransition { from, to });
        }
        self.set_phase(to, events);
        Ok(())
    }

    fn set_phase(&mut self, to: Phase, events: &mut EventQueue) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::debug!("Phase {from:?} -> {to:?}");
        self.phase = to;
        events.push(SimEvent::PhaseChanged { from, to });
    }

    pub fn add_score(&mut self, amount: u64, events: &mut EventQueue) {
        self.score += amount;
        events.push(SimEvent::ScoreChanged { score: self.score });
    }

    /// Apply a pickup. Level exits are handled by `complete_level`.
    pub fn collect(&mut self, kind: ItemKind, events: &mut EventQueue) {
        match kind {
            ItemKind::Coin => self.add_score(self.config.coin_score, events),
            ItemKind::PowerUp => self.fire_power = true,
            ItemKind::LevelExit => {}
        }
    }

    /// The player stood on `coord` this step. The checkpoint only ever moves right.
    pub fn record_ground(&mut self, coord: TileCoord, x: f32) {
        self.last_safe = Some(coord);
        self.checkpoint_x = self.checkpoint_x.max(x.floor());
    }

    /// Reset per-level state for level `index`, entering play if the previous
    /// level was just completed.
    pub fn begin_level(
        &mut self,
        index: usize,
        spawn: Vec2,
        events: &mut EventQueue,
    ) -> Result<(), ProgressionError> {
        if self.phase == Phase::LevelComplete {
            self.transition(Phase::Playing, events)?;
        }
        self.level_index = index;
        self.checkpoint_x = spawn.x;
        self.last_safe = None;
        self.reset_timer(events);
        Ok(())
    }

    pub fn complete_level(
        &mut self,
        level_count: usize,
        events: &mut EventQueue,
    ) -> Result<LevelAdvance, ProgressionError> {
        self.transition(Phase::LevelComplete, events)?;
        let next = self.level_index + 1;
        if next >= level_count {
            self.transition(Phase::Victory, events)?;
            return Ok(LevelAdvance::Victory);
        }
        Ok(LevelAdvance::Next(next))
    }

    /// Count down. Returns true once the clock has run out.
    pub fn tick_timer(&mut self, dt: f32, events: &mut EventQueue) -> bool {
        self.time_remaining = (self.time_remaining - dt).max(0.0);
        let shown = displayed_seconds(self.time_remaining);
        if shown != self.shown_seconds {
            self.shown_seconds = shown;
            events.push(SimEvent::TimeChanged { seconds: shown });
        }
        self.time_remaining <= 0.0
    }

    fn reset_timer(&mut self, events: &mut EventQueue) {
        self.time_remaining = self.config.level_time;
        self.shown_seconds = displayed_seconds(self.time_remaining);
        events.push(SimEvent::TimeChanged {
            seconds: self.shown_seconds,
        });
    }

    /// Lose a life and either respawn the body or end the game.
    ///
    /// `level_spawn` is used for pit deaths before any ground was recorded.
    pub fn on_death(
        &mut self,
        body: &mut PlayerBody,
        cause: DeathCause,
        level_spawn: Vec2,
        env: &Environmental,
        events: &mut EventQueue,
    ) -> Result<DeathOutcome, ProgressionError> {
        self.transition(Phase::Dying, events)?;
        self.lives = self.lives.saturating_sub(1);
        log::debug!("Player died ({cause:?}) at {:?}, {} lives left", body.position, self.lives);
        events.push(SimEvent::PlayerDied { cause });
        events.push(SimEvent::LivesChanged { lives: self.lives });
        self.fire_power = false;

        if self.lives == 0 {
            body.velocity = Vec2::ZERO;
            self.transition(Phase::GameOver, events)?;
            return Ok(DeathOutcome::GameOver);
        }

        self.transition(Phase::Respawning, events)?;
        let position = if body.position.y < self.config.pit_threshold {
            match self.last_safe {
                Some(safe) => Vec2::new(safe.x as f32, safe.y as f32 + 1.0),
                None => level_spawn,
            }
        } else {
            Vec2::new(
                (body.position.x - self.config.bounce_back_x).max(self.checkpoint_x),
                body.position.y + self.config.bounce_back_y,
            )
        };
        body.reset_at(position, env);
        if cause == DeathCause::TimeUp {
            self.reset_timer(events);
        }
        events.push(SimEvent::player_respawned(position));
        self.transition(Phase::Playing, events)?;
        Ok(DeathOutcome::Respawned(position))
    }

    /// Back to the first level with a fresh set of lives. Valid from any phase.
    pub fn restart(&mut self, events: &mut EventQueue) {
        self.lives = self.config.starting_lives;
        self.score = 0;
        self.level_index = 0;
        self.checkpoint_x = 0.0;
        self.last_safe = None;
        self.fire_power = false;
        self.set_phase(Phase::Playing, events);
        events.push(SimEvent::ScoreChanged { score: 0 });
        events.push(SimEvent::LivesChanged { lives: self.lives });
        self.reset_timer(events);
    }
}

fn displayed_seconds(time: f32) -> u32 {
    time.max(0.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::level::Environment;

    fn setup(lives: u32) -> (ProgressionState, PlayerBody, Environmental, EventQueue) {
        let mut config = SimConfig::default();
        config.progression.starting_lives = lives;
        let env = config.environmental(Environment::Surface);
        let body = PlayerBody::new(Vec2::new(10.0, 3.0), &config.physics, &env);
        (
            ProgressionState::new(config.progression),
            body,
            env,
            EventQueue::default(),
        )
    }

    #[test]
    fn death_costs_exactly_one_life_and_zeroes_velocity() {
        let (mut state, mut body, env, mut events) = setup(3);
        body.velocity = Vec2::new(4.0, -7.0);
        state.checkpoint_x = 5.0;

        let outcome = state
            .on_death(&mut body, DeathCause::Enemy, Vec2::ZERO, &env, &mut events)
            .expect("death from Playing is valid");

        assert_eq!(state.lives, 2);
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(outcome, DeathOutcome::Respawned(Vec2::new(8.0, 5.0)));
        assert_eq!(state.phase(), Phase::Playing);
    }

    #[test]
    fn bounce_back_never_passes_checkpoint() {
        let (mut state, mut body, env, mut events) = setup(3);
        state.checkpoint_x = 9.0;
        state
            .on_death(&mut body, DeathCause::Hazard, Vec2::ZERO, &env, &mut events)
            .expect("valid death");
        assert_eq!(body.position.x, 9.0);
    }

    #[test]
    fn pit_death_uses_last_safe_ground() {
        let (mut state, mut body, env, mut events) = setup(3);
        state.record_ground(TileCoord::new(6, 2), 6.3);
        body.position = Vec2::new(8.0, -3.0);
        state
            .on_death(&mut body, DeathCause::Fell, Vec2::ZERO, &env, &mut events)
            .expect("valid death");
        assert_eq!(body.position, Vec2::new(6.0, 3.0));
    }

    #[test]
    fn last_life_goes_to_game_over() {
        let (mut state, mut body, env, mut events) = setup(1);
        let outcome = state
            .on_death(&mut body, DeathCause::Fell, Vec2::ZERO, &env, &mut events)
            .expect("valid death");
        assert_eq!(outcome, DeathOutcome::GameOver);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase(), Phase::GameOver);

        let again = state.on_death(&mut body, DeathCause::Fell, Vec2::ZERO, &env, &mut events);
        assert_eq!(
            again,
            Err(ProgressionError::InvalidTransition {
                from: Phase::GameOver,
                to: Phase::Dying
            })
        );
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn checkpoint_is_monotone_and_resets_per_level() {
        let (mut state, _, _, mut events) = setup(3);
        state.record_ground(TileCoord::new(7, 0), 7.6);
        state.record_ground(TileCoord::new(4, 0), 4.2);
        assert_eq!(state.checkpoint_x, 7.0);

        state.complete_level(3, &mut events).expect("complete");
        state
            .begin_level(1, Vec2::new(2.0, 5.0), &mut events)
            .expect("next level");
        assert_eq!(state.checkpoint_x, 2.0);
        assert_eq!(state.last_safe, None);
        assert_eq!(state.phase(), Phase::Playing);
    }

    #[test]
    fn last_level_completion_is_victory() {
        let (mut state, _, _, mut events) = setup(3);
        state.level_index = 1;
        assert_eq!(
            state.complete_level(2, &mut events),
            Ok(LevelAdvance::Victory)
        );
        assert_eq!(state.phase(), Phase::Victory);
        assert!(state.phase().is_terminal());
    }

    #[test]
    fn timer_clamps_at_zero_and_reports_whole_seconds() {
        let (mut state, _, _, mut events) = setup(3);
        state.time_remaining = 1.5;
        assert!(!state.tick_timer(0.2, &mut events));
        assert!(!state.tick_timer(0.4, &mut events));
        assert!(state.tick_timer(5.0, &mut events));
        assert_eq!(state.time_remaining, 0.0);

        let seconds: Vec<u32> = events
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                SimEvent::TimeChanged { seconds } => Some(seconds),
                _ => None,
            })
            .collect();
        assert_eq!(seconds, vec![2, 1, 0]);
    }

    #[test]
    fn time_up_death_restores_the_clock() {
        let (mut state, mut body, env, mut events) = setup(3);
        state.time_remaining = 0.0;
        state
            .on_death(&mut body, DeathCause::TimeUp, Vec2::ZERO, &env, &mut events)
            .expect("valid death");
        assert_eq!(state.time_remaining, 400.0);
    }

    #[test]
    fn restart_is_valid_from_game_over() {
        let (mut state, mut body, env, mut events) = setup(1);
        state.add_score(500, &mut events);
        state.fire_power = true;
        state
            .on_death(&mut body, DeathCause::Enemy, Vec2::ZERO, &env, &mut events)
            .expect("valid death");
        assert_eq!(state.phase(), Phase::GameOver);

        state.restart(&mut events);
        assert_eq!(state.phase(), Phase::Playing);
        assert_eq!(state.lives, 1);
        assert_eq!(state.score, 0);
        assert!(!state.fire_power);
    }

    #[test]
    fn pickups_apply_score_and_fire_power() {
        let (mut state, _, _, mut events) = setup(3);
        state.collect(ItemKind::Coin, &mut events);
        state.collect(ItemKind::PowerUp, &mut events);
        assert_eq!(state.score, 50);
        assert!(state.fire_power);
    }
}
