//! Game configuration. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::is_yaml;
use crate::store::read_text_auto;

pub const DEFAULT_STARTER_KIT: [i32; 5] = [201, 203, 101, 102, 103];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// External data file; the bundled data is used when unset.
    pub data_file: Option<PathBuf>,
    pub save_dir: PathBuf,
    pub slot_count: u32,
    pub battles_per_checkpoint: u32,
    pub default_max_hp: i32,
    pub starter_kit: Vec<i32>,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            save_dir: PathBuf::from("saves"),
            slot_count: 3,
            battles_per_checkpoint: 3,
            default_max_hp: 100,
            starter_kit: DEFAULT_STARTER_KIT.to_vec(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load from `.json`, `.yaml` or `.yml`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_text_auto(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = if is_yaml(path) {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse YAML config {}", path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse JSON config {}", path.display()))?
        };
        Ok(config)
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            battles_per_checkpoint: self.battles_per_checkpoint.max(1),
            default_max_hp: self.default_max_hp,
        }
    }
}

/// The part of the configuration an adventure run reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub battles_per_checkpoint: u32,
    /// Max HP when no armor is worn.
    pub default_max_hp: i32,
}

impl Default for RunSettings {
    fn default() -> Self {
        GameConfig::default().run_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.yaml");
        std::fs::write(&path, "slot_count: 5\nseed: 7\n").unwrap();
        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.slot_count, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.battles_per_checkpoint, 3);
        assert_eq!(config.starter_kit, DEFAULT_STARTER_KIT.to_vec());
    }

    #[test]
    fn zero_battles_per_checkpoint_is_raised_to_one() {
        let config = GameConfig { battles_per_checkpoint: 0, ..GameConfig::default() };
        assert_eq!(config.run_settings().battles_per_checkpoint, 1);
    }
}
