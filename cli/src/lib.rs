//! Shared pieces of the `steelsoul` and `simulate-runs` binaries.

pub mod autopilot;
pub mod render;

use anyhow::{Context, Result};
use steelsoul_engine::{GameConfig, GameData, builtin_gamedata};

/// Configured data file, or the bundled data when none is set.
pub fn load_game_data(config: &GameConfig) -> Result<GameData> {
    match &config.data_file {
        Some(path) => GameData::load(path),
        None => builtin_gamedata().context("bundled game data is invalid"),
    }
}
