use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::equipment::{Equipment, EquipmentKind};
use crate::error::GameError;
use crate::inventory::{EquipmentSlot, Inventory, ItemKey};
use crate::ledger::AdventureStats;

/// Anything experience can be paid from.
pub trait Wallet {
    fn available(&self) -> i32;
    fn debit(&mut self, amount: i32);

    /// Debit `amount` if affordable; otherwise leave the balance alone.
    fn try_spend(&mut self, amount: i32) -> Result<(), GameError> {
        let available = self.available();
        if available < amount {
            return Err(GameError::InsufficientExp { needed: amount, available });
        }
        self.debit(amount);
        Ok(())
    }
}

/// Banked experience.
impl Wallet for i32 {
    fn available(&self) -> i32 {
        *self
    }

    fn debit(&mut self, amount: i32) {
        *self -= amount;
    }
}

/// Mid-run balance: spends are booked on the ledger, banked exp is untouched until settlement.
pub struct RunWallet<'a> {
    pub persistent_exp: i32,
    pub stats: &'a mut AdventureStats,
}

impl Wallet for RunWallet<'_> {
    fn available(&self) -> i32 {
        self.stats.available(self.persistent_exp)
    }

    fn debit(&mut self, amount: i32) {
        self.stats.exp_spent += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReceipt {
    pub key: ItemKey,
    pub name: String,
    pub new_level: u8,
    pub cost: i32,
}

/// Level up one inventory item, paying from `wallet`. Nothing changes on failure.
pub fn upgrade_item<W: Wallet + ?Sized>(
    inventory: &mut Inventory,
    key: ItemKey,
    wallet: &mut W,
) -> Result<UpgradeReceipt, GameError> {
    let item = inventory.get_mut(key).ok_or(GameError::UnknownItem(key))?;
    if !item.can_level_up() {
        return Err(GameError::MaxLevel { name: item.name().to_string(), level: item.level() });
    }
    let cost = item.upgrade_cost();
    wallet.try_spend(cost)?;
    item.level_up();
    info!(item = item.name(), level = item.level(), cost, "equipment upgraded");
    Ok(UpgradeReceipt {
        key,
        name: item.name().to_string(),
        new_level: item.level(),
        cost,
    })
}

#[derive(Debug, Clone, Default)]
pub struct Player {
    pub name: String,
    /// Banked experience; only changes outside a run or at run settlement.
    pub exp: i32,
    pub inventory: Inventory,
    pub loadout: EquipmentSlot,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Fresh profile holding a level-1 clone of every starter template the catalog knows.
    pub fn with_starter_kit(name: impl Into<String>, catalog: &Catalog, kit: &[i32]) -> Self {
        let mut player = Self::new(name);
        for &tid in kit {
            match catalog.clone_prototype(tid, 1) {
                Some(item) => {
                    player.inventory.insert(item);
                }
                None => warn!(tid, "starter kit template missing from catalog"),
            }
        }
        info!(player = %player.name, items = player.inventory.len(), "starter kit issued");
        player
    }

    /// Max HP granted by the worn armor, or `default_hp` bare.
    pub fn max_hp(&self, default_hp: i32) -> i32 {
        self.loadout
            .armor(&self.inventory)
            .map_or(default_hp, |a| a.max_hp())
    }

    pub fn equip_armor(&mut self, key: ItemKey) -> Result<(), GameError> {
        let armor = self.inventory.get(key).ok_or(GameError::UnknownItem(key))?;
        let armor = armor
            .as_armor()
            .ok_or(GameError::WrongKind { key, expected: EquipmentKind::Armor })?;
        let weight = self.loadout.total_weight(&self.inventory);
        if weight > armor.capacity() {
            return Err(GameError::OverCapacity { weight, capacity: armor.capacity() });
        }
        info!(armor = %armor.name, "armor equipped");
        self.loadout.set_armor(Some(key));
        Ok(())
    }

    /// Take the armor off. Weapons can't be carried without it, so they come off too.
    pub fn unequip_armor(&mut self) -> Option<ItemKey> {
        let key = self.loadout.armor_key()?;
        self.loadout.set_armor(None);
        self.loadout.clear_weapons();
        Some(key)
    }

    pub fn equip_weapon(&mut self, key: ItemKey) -> Result<(), GameError> {
        let armor = self.loadout.armor(&self.inventory).ok_or(GameError::ArmorRequired)?;
        let weapon = self.inventory.get(key).ok_or(GameError::UnknownItem(key))?;
        let weapon = weapon
            .as_weapon()
            .ok_or(GameError::WrongKind { key, expected: EquipmentKind::Weapon })?;
        if self.loadout.is_equipped(key) {
            return Err(GameError::AlreadyEquipped(key));
        }
        let weight = self.loadout.total_weight(&self.inventory) + weapon.weight();
        let capacity = armor.capacity();
        if weight > capacity {
            return Err(GameError::OverCapacity { weight, capacity });
        }
        info!(weapon = %weapon.name, weight, capacity, "weapon equipped");
        self.loadout.push_weapon(key)
    }

    /// Unequip the weapon at `index` in strike order.
    pub fn unequip_weapon(&mut self, index: usize) -> Result<ItemKey, GameError> {
        self.loadout.remove_weapon_at(index)
    }

    /// Upgrade with banked experience (base camp).
    pub fn upgrade(&mut self, key: ItemKey) -> Result<UpgradeReceipt, GameError> {
        upgrade_item(&mut self.inventory, key, &mut self.exp)
    }

    /// Discard an item; refused while it is worn.
    pub fn discard(&mut self, key: ItemKey) -> Result<Equipment, GameError> {
        self.inventory.remove(key, &self.loadout)
    }
}
