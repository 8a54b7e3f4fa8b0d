use anyhow::Result;

use crate::catalog::GameData;

/// Game data bundled into the binary, used when no data file is configured.
pub const GAMEDATA_JSON: &str = include_str!("../content/gamedata.json");

pub fn builtin_gamedata() -> Result<GameData> {
    GameData::from_json_str(GAMEDATA_JSON)
}
