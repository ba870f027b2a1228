//! Logical action state with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(action)` is true every tick the action
//!   is active. Used for continuous effects like movement and running.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   tick the transition happened, and cleared by `end_frame()`. Single-shot
//!   effects (jump impulse, jump cut, fireball spawn) read these so a held
//!   button never repeats them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Run,
    Shoot,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Run,
        Action::Shoot,
    ];
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Action>,
    just_pressed: HashSet<Action>,
    just_released: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Drive the state from a full set of held actions, deriving the edges.
    pub fn apply_held(&mut self, held: &[Action]) {
        for &action in Action::ALL {
            if held.contains(&action) {
                self.press(action);
            } else {
                self.release(action);
            }
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn is_just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    /// Horizontal intent in {-1, 0, 1}. Right wins when both are held.
    pub fn move_axis(&self) -> f32 {
        if self.is_held(Action::MoveRight) {
            1.0
        } else if self.is_held(Action::MoveLeft) {
            -1.0
        } else {
            0.0
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
