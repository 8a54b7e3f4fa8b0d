//! Equipment prototypes and monster templates, loaded once from the game data file.
//!
//! The catalog is built at startup and only ever lent out by shared reference;
//! everything the player owns is a clone of one of its prototypes.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::equipment::{Armor, ArmorStats, Equipment, PROTOTYPE_LEVEL, Rarity, Weapon, WeaponStats};
use crate::store::read_text_auto;

const DEFAULT_CRIT_RATE: i32 = 0;
const DEFAULT_ATK_SPEED: i32 = 1;
const DEFAULT_WEIGHT: i32 = 1;
const DEFAULT_DODGE_RATE: i32 = 0;
const DEFAULT_CAPACITY: i32 = 10;

/// One equipment record as it appears in the data file. Every field is optional
/// here; [`EquipmentEntry::to_prototype`] decides what is actually required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EquipmentEntry {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    /// Stored by the data file but meaningless for prototypes.
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub atk: Option<i32>,
    #[serde(default)]
    pub crit_rate: Option<i32>,
    #[serde(default)]
    pub atk_speed: Option<i32>,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub hp: Option<i32>,
    #[serde(default)]
    pub dodge_rate: Option<i32>,
    #[serde(default)]
    pub capacity: Option<i32>,
}

impl EquipmentEntry {
    pub fn to_prototype(&self) -> Result<Equipment, String> {
        let id = self.id.ok_or("missing id")?;
        let kind = self.kind.as_deref().ok_or("missing type")?;
        let name = self.name.clone().ok_or("missing name")?;
        let faction = self.faction.clone().ok_or("missing faction")?;
        let rarity = match self.rarity.as_deref() {
            Some(token) => token.parse::<Rarity>().unwrap_or_else(|e| {
                warn!(id, "{}; using STANDARD", e);
                Rarity::Standard
            }),
            None => Rarity::Standard,
        };

        match kind.to_ascii_lowercase().as_str() {
            "weapon" => {
                let base = WeaponStats {
                    atk: self.atk.ok_or("weapon missing atk")?,
                    crit_rate: self.crit_rate.unwrap_or(DEFAULT_CRIT_RATE),
                    atk_speed: self.atk_speed.unwrap_or(DEFAULT_ATK_SPEED),
                    weight: self.weight.unwrap_or(DEFAULT_WEIGHT),
                };
                Ok(Weapon::new(id, name, rarity, PROTOTYPE_LEVEL, faction, base).into())
            }
            "armor" => {
                let base = ArmorStats {
                    max_hp: self.hp.ok_or("armor missing hp")?,
                    dodge_rate: self.dodge_rate.unwrap_or(DEFAULT_DODGE_RATE),
                    capacity: self.capacity.unwrap_or(DEFAULT_CAPACITY),
                };
                Ok(Armor::new(id, name, rarity, PROTOTYPE_LEVEL, faction, base).into())
            }
            other => Err(format!("unknown type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    prototypes: BTreeMap<i32, Equipment>,
}

impl Catalog {
    /// Build prototypes from parsed entries. Bad entries are skipped with a warning.
    pub fn load(entries: impl IntoIterator<Item = EquipmentEntry>) -> Self {
        let mut prototypes = BTreeMap::new();
        for (idx, entry) in entries.into_iter().enumerate() {
            match entry.to_prototype() {
                Ok(proto) => {
                    let id = proto.template_id();
                    if prototypes.insert(id, proto).is_some() {
                        warn!(id, "duplicate equipment id; later entry wins");
                    }
                }
                Err(reason) => warn!(entry = idx, "skipping equipment entry: {}", reason),
            }
        }
        info!(count = prototypes.len(), "equipment catalog loaded");
        Self { prototypes }
    }

    /// Build from ready-made items; each is reset to the prototype level.
    pub fn from_prototypes(items: impl IntoIterator<Item = Equipment>) -> Self {
        let prototypes = items
            .into_iter()
            .map(|mut item| {
                match &mut item {
                    Equipment::Weapon(w) => w.level = PROTOTYPE_LEVEL,
                    Equipment::Armor(a) => a.level = PROTOTYPE_LEVEL,
                }
                (item.template_id(), item)
            })
            .collect();
        Self { prototypes }
    }

    pub fn prototype(&self, id: i32) -> Option<&Equipment> {
        self.prototypes.get(&id)
    }

    /// New owned item cloned from prototype `id` at `level`, keeping the prototype's name.
    pub fn clone_prototype(&self, id: i32, level: u8) -> Option<Equipment> {
        let proto = self.prototype(id)?;
        Some(proto.clone_as(proto.name(), level))
    }

    pub fn contains(&self, id: i32) -> bool {
        self.prototypes.contains_key(&id)
    }

    /// Prototypes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        self.prototypes.values()
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Template ids grouped by rarity, indexed by `Rarity::ordinal`.
    pub fn ids_by_rarity(&self) -> [Vec<i32>; 4] {
        let mut pools: [Vec<i32>; 4] = Default::default();
        for proto in self.prototypes.values() {
            pools[proto.rarity().ordinal() as usize].push(proto.template_id());
        }
        pools
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub id: i32,
    pub name: String,
    pub hp: i32,
    pub atk: i32,
    pub exp: i32,
}

#[derive(Debug, Clone, Default)]
pub struct Bestiary {
    monsters: Vec<MonsterTemplate>,
}

impl Bestiary {
    pub fn new(monsters: Vec<MonsterTemplate>) -> Self {
        Self { monsters }
    }

    pub fn monsters(&self) -> &[MonsterTemplate] {
        &self.monsters
    }

    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }
}

/// Everything read from the game data file.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    pub catalog: Catalog,
    pub bestiary: Bestiary,
}

impl GameData {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text).context("failed to parse game data JSON")?;
        Ok(Self::from_value(root))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text).context("failed to parse game data YAML")?;
        Ok(Self::from_value(root))
    }

    /// Read a `.json`, `.yaml` or `.yml` data file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_text_auto(path)
            .with_context(|| format!("failed to read game data: {}", path.display()))?;
        let data = if is_yaml(path) {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        };
        data.with_context(|| format!("in game data file {}", path.display()))
    }

    /// Accepts `{ "equipments": [...], "monsters": [...] }` or a bare equipment array.
    fn from_value(root: Value) -> Self {
        let (equipments, monsters) = match root {
            Value::Array(items) => (items, Vec::new()),
            Value::Object(mut map) => {
                let take = |v: Option<Value>| match v {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                (take(map.remove("equipments")), take(map.remove("monsters")))
            }
            _ => {
                warn!("game data root is neither an object nor an array");
                (Vec::new(), Vec::new())
            }
        };

        let entries = equipments.into_iter().enumerate().filter_map(|(idx, v)| {
            serde_json::from_value::<EquipmentEntry>(v)
                .map_err(|e| warn!(entry = idx, "malformed equipment entry: {}", e))
                .ok()
        });
        let catalog = Catalog::load(entries);

        let monsters: Vec<MonsterTemplate> = monsters
            .into_iter()
            .enumerate()
            .filter_map(|(idx, v)| {
                serde_json::from_value(v)
                    .map_err(|e| warn!(entry = idx, "skipping monster entry: {}", e))
                    .ok()
            })
            .collect();
        info!(count = monsters.len(), "bestiary loaded");

        Self {
            catalog,
            bestiary: Bestiary::new(monsters),
        }
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("yaml" | "yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_extension_detection() {
        assert!(is_yaml(Path::new("data/game.yaml")));
        assert!(is_yaml(Path::new("GAME.YML")));
        assert!(!is_yaml(Path::new("gamedata.json")));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let entry = EquipmentEntry {
            id: Some(1),
            kind: Some("shield".into()),
            name: Some("Buckler".into()),
            faction: Some("None".into()),
            ..Default::default()
        };
        assert!(entry.to_prototype().is_err());
    }
}
