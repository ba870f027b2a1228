use serde::Deserialize;
use std::fs;
use std::path::Path;

use tilerun_core::input::Action;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Actions held during the frame. Press/release edges are derived from
    /// the difference with the previous frame.
    #[serde(default)]
    pub held: Vec<Action>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Restart the game before the first repetition of this frame.
    #[serde(default)]
    pub restart: bool,
}

/// One expanded frame of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    pub held: Vec<Action>,
    pub restart: bool,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<ReplayStep> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(ReplayStep {
                    held: frame.held.clone(),
                    restart: frame.restart && i == 0,
                });
            }
        }
        out
    }

    /// Run right, hopping every second.
    pub fn demo() -> Self {
        let run = ReplayFrame {
            held: vec![Action::MoveRight, Action::Run],
            repeat: 50,
            restart: false,
        };
        let hop = ReplayFrame {
            held: vec![Action::MoveRight, Action::Run, Action::Jump],
            repeat: 10,
            restart: false,
        };
        let mut frames = Vec::new();
        for _ in 0..20 {
            frames.push(run.clone());
            frames.push(hop.clone());
        }
        Self {
            fixed_dt: default_dt(),
            frames,
        }
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tilerun_core::input::InputState;
    use tilerun_sim::config::SimConfig;
    use tilerun_sim::level::LevelPack;
    use tilerun_sim::sim::Simulation;

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tilerun_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn play(replay: &ReplaySequence) -> Simulation {
        let mut sim = Simulation::new(LevelPack::builtin(), SimConfig::default())
            .expect("builtin pack should load");
        let mut input = InputState::new();
        for step in replay.expanded_inputs() {
            if step.restart {
                sim.restart();
            }
            input.apply_held(&step.held);
            sim.tick(&input, replay.fixed_dt);
            input.end_frame();
        }
        sim
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "held": ["move_right"], "repeat": 3 },
                { "held": ["move_right", "jump"], "restart": true, "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 5);
        assert_eq!(expanded[3].held, vec![Action::MoveRight, Action::Jump]);
        assert!(expanded[3].restart);
        assert!(!expanded[4].restart);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_unknown_action() {
        let path = temp_file_path("unknown");
        fs::write(&path, r#"{ "frames": [ { "held": ["fly"] } ] }"#).expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("unknown action should fail");
        assert!(err.contains("Failed to parse replay JSON"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_replay_file_reports_path() {
        let path = temp_file_path("missing");
        let err = load_replay_from_path(&path).expect_err("missing file should fail");
        assert!(err.starts_with("Failed to read"));
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = ReplaySequence::demo();
        let a = play(&replay);
        let b = play(&replay);

        assert_eq!(a.player().position, b.player().position);
        assert_eq!(a.player().velocity, b.player().velocity);
        assert_eq!(a.progression().score, b.progression().score);
        assert_eq!(a.progression().lives, b.progression().lives);
        assert_eq!(a.phase(), b.phase());
    }
}
