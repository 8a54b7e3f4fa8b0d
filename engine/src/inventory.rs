use std::fmt;

use serde::{Deserialize, Serialize};

use crate::equipment::{Armor, Equipment, Weapon};
use crate::error::GameError;

/// Stable handle to an inventory item. Keys are never reused within an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey(pub u32);

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Player-owned items in acquisition order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<(ItemKey, Equipment)>,
    next_key: u32,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: Equipment) -> ItemKey {
        let key = ItemKey(self.next_key);
        self.next_key += 1;
        self.items.push((key, item));
        key
    }

    pub fn get(&self, key: ItemKey) -> Option<&Equipment> {
        self.items.iter().find(|(k, _)| *k == key).map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, key: ItemKey) -> Option<&mut Equipment> {
        self.items.iter_mut().find(|(k, _)| *k == key).map(|(_, item)| item)
    }

    pub fn weapon(&self, key: ItemKey) -> Option<&Weapon> {
        self.get(key).and_then(Equipment::as_weapon)
    }

    pub fn armor(&self, key: ItemKey) -> Option<&Armor> {
        self.get(key).and_then(Equipment::as_armor)
    }

    /// Remove an item unless `slot` still wears it.
    pub fn remove(&mut self, key: ItemKey, slot: &EquipmentSlot) -> Result<Equipment, GameError> {
        if slot.is_equipped(key) {
            return Err(GameError::ItemInUse(key));
        }
        let pos = self
            .items
            .iter()
            .position(|(k, _)| *k == key)
            .ok_or(GameError::UnknownItem(key))?;
        Ok(self.items.remove(pos).1)
    }

    /// Key of the item at a menu position.
    pub fn key_at(&self, index: usize) -> Result<ItemKey, GameError> {
        self.items
            .get(index)
            .map(|(k, _)| *k)
            .ok_or(GameError::InvalidSelection { index, len: self.items.len() })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKey, &Equipment)> {
        self.items.iter().map(|(k, item)| (*k, item))
    }

    pub fn weapons(&self) -> impl Iterator<Item = (ItemKey, &Weapon)> {
        self.iter().filter_map(|(k, item)| item.as_weapon().map(|w| (k, w)))
    }

    pub fn armors(&self) -> impl Iterator<Item = (ItemKey, &Armor)> {
        self.iter().filter_map(|(k, item)| item.as_armor().map(|a| (k, a)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What the player is wearing: handles into the inventory, never owned items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentSlot {
    armor: Option<ItemKey>,
    weapons: Vec<ItemKey>,
}

impl EquipmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armor_key(&self) -> Option<ItemKey> {
        self.armor
    }

    /// Weapon handles in strike order.
    pub fn weapon_keys(&self) -> &[ItemKey] {
        &self.weapons
    }

    pub fn is_equipped(&self, key: ItemKey) -> bool {
        self.armor == Some(key) || self.weapons.contains(&key)
    }

    pub(crate) fn set_armor(&mut self, key: Option<ItemKey>) {
        self.armor = key;
    }

    pub(crate) fn push_weapon(&mut self, key: ItemKey) -> Result<(), GameError> {
        if self.weapons.contains(&key) {
            return Err(GameError::AlreadyEquipped(key));
        }
        self.weapons.push(key);
        Ok(())
    }

    pub(crate) fn remove_weapon_at(&mut self, index: usize) -> Result<ItemKey, GameError> {
        if index >= self.weapons.len() {
            return Err(GameError::InvalidSelection { index, len: self.weapons.len() });
        }
        Ok(self.weapons.remove(index))
    }

    pub(crate) fn clear_weapons(&mut self) {
        self.weapons.clear();
    }

    pub fn armor<'a>(&self, inventory: &'a Inventory) -> Option<&'a Armor> {
        self.armor.and_then(|k| inventory.armor(k))
    }

    pub fn weapons<'a>(&self, inventory: &'a Inventory) -> Vec<&'a Weapon> {
        self.weapons.iter().filter_map(|k| inventory.weapon(*k)).collect()
    }

    pub fn total_weight(&self, inventory: &Inventory) -> i32 {
        self.weapons(inventory).iter().map(|w| w.weight()).sum()
    }

    pub fn effective_dodge(&self, inventory: &Inventory) -> i32 {
        effective_dodge(self.armor(inventory), self.total_weight(inventory))
    }

    pub fn is_overweight(&self, inventory: &Inventory) -> bool {
        self.armor(inventory)
            .is_some_and(|a| exceeds_dodge_limit(self.total_weight(inventory), a.capacity()))
    }
}

/// True when `weight` is above 60% of `capacity`.
pub fn exceeds_dodge_limit(weight: i32, capacity: i32) -> bool {
    i64::from(weight) * 5 > i64::from(capacity) * 3
}

/// Nominal dodge of the armor, zero without armor or when carrying more than 60% of capacity.
pub fn effective_dodge(armor: Option<&Armor>, total_weight: i32) -> i32 {
    match armor {
        Some(a) if !exceeds_dodge_limit(total_weight, a.capacity()) => a.dodge_rate(),
        _ => 0,
    }
}
