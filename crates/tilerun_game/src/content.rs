//! Optional on-disk overrides for the simulation config and the level pack.

use std::fs;
use std::path::Path;

use tilerun_sim::config::SimConfig;
use tilerun_sim::level::{LevelLayout, LevelPack};

pub fn load_config_from_path(path: &Path) -> Result<SimConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    SimConfig::from_json_str(&raw).map_err(|e| format!("{} ({})", e, path.display()))
}

/// Load a level pack and check that every level parses. Individual parse
/// failures are only warnings: the simulation substitutes a fallback level.
pub fn load_level_pack_from_path(path: &Path) -> Result<LevelPack, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let pack = LevelPack::from_json_str(&raw).map_err(|e| format!("{} ({})", e, path.display()))?;

    for def in &pack.levels {
        if let Err(e) = LevelLayout::parse(def) {
            log::warn!("{e}");
        }
    }
    log::info!("Loaded {} levels from {}", pack.len(), path.display());
    Ok(pack)
}
