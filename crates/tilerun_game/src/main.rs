//! Headless runner: plays a replay through the simulation and logs what happens.
//!
//! ```text
//! tilerun_game [replay.json] [--levels levels.json] [--config config.json]
//! ```
//!
//! Without a replay file the built-in demo input is used. The final snapshot
//! is printed to stdout as JSON.

mod content;
mod replay;

use std::path::PathBuf;

use tilerun_core::input::InputState;
use tilerun_sim::config::SimConfig;
use tilerun_sim::events::SimEvent;
use tilerun_sim::level::LevelPack;
use tilerun_sim::sim::Simulation;

use crate::content::{load_config_from_path, load_level_pack_from_path};
use crate::replay::{load_replay_from_path, ReplaySequence};

struct RunArgs {
    replay: Option<PathBuf>,
    levels: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn usage() -> String {
    "Usage: cargo run -p tilerun_game -- [replay.json] [--levels <levels.json>] [--config <config.json>]\nExample: cargo run -p tilerun_game -- --levels crates/tilerun_game/assets/levels.json".to_string()
}

fn parse_args(args: &[String]) -> Result<RunArgs, String> {
    let mut run = RunArgs {
        replay: None,
        levels: None,
        config: None,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--levels" => {
                let path = iter.next().ok_or_else(usage)?;
                run.levels = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = iter.next().ok_or_else(usage)?;
                run.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(usage()),
            other if other.starts_with("--") => {
                return Err(format!("Unknown option '{other}'\n{}", usage()));
            }
            other => {
                if run.replay.is_some() {
                    return Err(usage());
                }
                run.replay = Some(PathBuf::from(other));
            }
        }
    }
    Ok(run)
}

fn log_event(frame: usize, event: &SimEvent) {
    match event {
        SimEvent::TimeChanged { .. } | SimEvent::ScorePopup { .. } => {
            log::trace!("[{frame}] {event:?}");
        }
        SimEvent::PhaseChanged { .. }
        | SimEvent::LevelChanged { .. }
        | SimEvent::PlayerDied { .. } => log::info!("[{frame}] {event:?}"),
        _ => log::debug!("[{frame}] {event:?}"),
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let run = parse_args(&args)?;

    let config = match &run.config {
        Some(path) => load_config_from_path(path)?,
        None => SimConfig::default(),
    };
    let pack = match &run.levels {
        Some(path) => load_level_pack_from_path(path)?,
        None => LevelPack::builtin(),
    };
    let replay = match &run.replay {
        Some(path) => load_replay_from_path(path)?,
        None => {
            log::info!("No replay given, using the built-in demo input");
            ReplaySequence::demo()
        }
    };

    let mut sim = Simulation::new(pack, config).map_err(|e| e.to_string())?;
    let mut input = InputState::new();
    let steps = replay.expanded_inputs();
    log::info!("Running {} frames at dt={:.4}", steps.len(), replay.fixed_dt);

    for (frame, step) in steps.iter().enumerate() {
        if step.restart {
            sim.restart();
        }
        input.apply_held(&step.held);
        sim.tick(&input, replay.fixed_dt);
        input.end_frame();

        for event in sim.drain_events() {
            log_event(frame, &event);
        }
        if sim.phase().is_terminal() && !steps[frame + 1..].iter().any(|s| s.restart) {
            log::info!("Reached {:?} at frame {frame}", sim.phase());
            break;
        }
    }

    let snapshot = sim.snapshot();
    log::info!(
        "Finished in {:?}: level {} '{}', score {}, lives {}",
        snapshot.phase,
        snapshot.level_index,
        snapshot.level_name,
        snapshot.score,
        snapshot.lives
    );
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| format!("Failed to serialize snapshot: {e}"))?;
    println!("{json}");
    Ok(())
}
