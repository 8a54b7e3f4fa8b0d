//! On-disk records for a save slot and its shops, and their reconstruction
//! through the catalog. Only `(template id, level)` pairs are persisted; stats
//! always come back from the prototype.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::equipment::{Equipment, EquipmentKind, Rarity};
use crate::inventory::ItemKey;
use crate::player::Player;
use crate::shop::Shop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub tid: i32,
    pub lv: i32,
    /// Rarity ordinal at save time; informational, the catalog wins on reload.
    #[serde(default)]
    pub rar: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub exp: i32,
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
    #[serde(default, with = "armor_id")]
    pub equipped_armor_id: Option<i32>,
    #[serde(default)]
    pub equipped_weapon_ids: Vec<i32>,
}

/// `equipped_armor_id` is an int or the string `"none"`.
mod armor_id {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(i32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<i32>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => s.serialize_i32(*id),
            None => s.serialize_str("none"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            Some(Raw::Id(id)) if id >= 0 => Some(id),
            Some(Raw::Text(text)) => text.trim().parse::<i32>().ok().filter(|id| *id >= 0),
            _ => None,
        })
    }
}

impl SaveRecord {
    /// An empty slot as written by slot initialization.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.player_name.trim().is_empty()
    }

    pub fn from_player(player: &Player) -> Self {
        let inventory = player
            .inventory
            .iter()
            .map(|(_, item)| InventoryEntry {
                tid: item.template_id(),
                lv: i32::from(item.level()),
                rar: item.rarity().ordinal(),
            })
            .collect();
        let template_of = |key: ItemKey| player.inventory.get(key).map(Equipment::template_id);
        Self {
            player_name: player.name.clone(),
            exp: player.exp,
            inventory,
            equipped_armor_id: player.loadout.armor_key().and_then(template_of),
            equipped_weapon_ids: player
                .loadout
                .weapon_keys()
                .iter()
                .filter_map(|k| template_of(*k))
                .collect(),
        }
    }

    /// Rebuild the player. Unknown templates are dropped; equipped items are
    /// re-matched by template id against not-yet-used inventory items.
    pub fn restore_player(&self, catalog: &Catalog) -> Player {
        let mut player = Player::new(self.player_name.clone());
        player.exp = self.exp;

        for entry in &self.inventory {
            let Some(proto) = catalog.prototype(entry.tid) else {
                warn!(tid = entry.tid, "dropping saved item with unknown template");
                continue;
            };
            let level = entry.lv.clamp(1, i32::from(proto.max_level())) as u8;
            if Rarity::from_ordinal(entry.rar) != Some(proto.rarity()) {
                warn!(
                    tid = entry.tid,
                    saved = entry.rar,
                    catalog = %proto.rarity(),
                    "saved rarity differs from catalog; using catalog"
                );
            }
            if let Some(item) = catalog.clone_prototype(entry.tid, level) {
                player.inventory.insert(item);
            }
        }

        let mut used: Vec<ItemKey> = Vec::new();
        let mut claim = |player: &Player, tid: i32, kind: EquipmentKind| -> Option<ItemKey> {
            let key = player
                .inventory
                .iter()
                .find(|(k, item)| {
                    item.template_id() == tid && item.kind() == kind && !used.contains(k)
                })
                .map(|(k, _)| k)?;
            used.push(key);
            Some(key)
        };

        if let Some(tid) = self.equipped_armor_id {
            match claim(&player, tid, EquipmentKind::Armor) {
                Some(key) => {
                    if let Err(e) = player.equip_armor(key) {
                        warn!(tid, "could not re-equip saved armor: {}", e);
                    }
                }
                None => warn!(tid, "saved armor not found in inventory"),
            }
        }
        for &tid in &self.equipped_weapon_ids {
            match claim(&player, tid, EquipmentKind::Weapon) {
                Some(key) => {
                    if let Err(e) = player.equip_weapon(key) {
                        warn!(tid, "could not re-equip saved weapon: {}", e);
                    }
                }
                None => warn!(tid, "saved weapon not found in inventory"),
            }
        }
        debug!(items = player.inventory.len(), "player restored");
        player
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItemRecord {
    pub equipment_id: i32,
    #[serde(default = "default_level")]
    pub equipment_level: u8,
    pub price: i32,
}

fn default_level() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

fn default_fee() -> i32 {
    crate::shop::BASE_REROLL_FEE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopRecord {
    #[serde(default = "default_true")]
    pub needs_refresh: bool,
    #[serde(default = "default_fee")]
    pub manual_refresh_cost: i32,
    #[serde(default)]
    pub items: Vec<ShopItemRecord>,
}

impl Default for ShopRecord {
    fn default() -> Self {
        Self { needs_refresh: true, manual_refresh_cost: default_fee(), items: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopsRecord {
    #[serde(default)]
    pub base_shop: ShopRecord,
    #[serde(default, alias = "campfire_shop")]
    pub checkpoint_shop: ShopRecord,
}

/// The base-camp shop and the shop offered at checkpoints.
#[derive(Debug, Clone, Default)]
pub struct Shops {
    pub base: Shop,
    pub checkpoint: Shop,
}

impl Shops {
    pub fn to_record(&self) -> ShopsRecord {
        ShopsRecord {
            base_shop: self.base.to_record(),
            checkpoint_shop: self.checkpoint.to_record(),
        }
    }

    pub fn from_record(record: &ShopsRecord, catalog: &Catalog) -> Self {
        Self {
            base: Shop::from_record(&record.base_shop, catalog),
            checkpoint: Shop::from_record(&record.checkpoint_shop, catalog),
        }
    }
}
