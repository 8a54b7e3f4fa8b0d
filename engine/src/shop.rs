//! Rarity-weighted equipment vendor.

use tracing::{info, warn};

use crate::Dice;
use crate::catalog::Catalog;
use crate::equipment::{Equipment, Rarity};
use crate::error::GameError;
use crate::inventory::{Inventory, ItemKey};
use crate::player::Wallet;
use crate::save::{ShopItemRecord, ShopRecord};

pub const SHOP_SLOTS: usize = 3;
pub const BASE_PRICE: i32 = 500;
pub const BASE_REROLL_FEE: i32 = 50;
const MAX_DRAWS: usize = 100;

/// Pool tried when the rolled rarity has no templates.
const FALLBACK_ORDER: [Rarity; 4] =
    [Rarity::Standard, Rarity::Broken, Rarity::Military, Rarity::Legendary];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopOffer {
    pub item: Equipment,
    pub price: i32,
}

impl ShopOffer {
    pub fn new(item: Equipment) -> Self {
        let price = price_for(item.rarity());
        Self { item, price }
    }
}

pub fn price_for(rarity: Rarity) -> i32 {
    BASE_PRICE * rarity.multiplier()
}

/// Map a `[0, 99]` roll onto the 50/30/15/5 rarity table.
pub fn rarity_for_roll(roll: i32) -> Rarity {
    match roll {
        i32::MIN..=49 => Rarity::Broken,
        50..=79 => Rarity::Standard,
        80..=94 => Rarity::Military,
        _ => Rarity::Legendary,
    }
}

/// One weighted draw: a rarity from the table, then a uniform template within its pool.
pub fn draw_template(pools: &[Vec<i32>; 4], dice: &mut Dice) -> Option<i32> {
    let rolled = rarity_for_roll(dice.percentile());
    let pool = std::iter::once(rolled)
        .chain(FALLBACK_ORDER)
        .map(|r| &pools[r.ordinal() as usize])
        .find(|pool| !pool.is_empty())?;
    Some(pool[dice.index(pool.len())])
}

#[derive(Debug, Clone)]
pub struct Shop {
    offers: Vec<ShopOffer>,
    needs_refresh: bool,
    reroll_fee: i32,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}

impl Shop {
    /// An empty shop waiting for its first refresh.
    pub fn new() -> Self {
        Self { offers: Vec::new(), needs_refresh: true, reroll_fee: BASE_REROLL_FEE }
    }

    pub fn offers(&self) -> &[ShopOffer] {
        &self.offers
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn mark_needs_refresh(&mut self) {
        self.needs_refresh = true;
    }

    pub fn reroll_fee(&self) -> i32 {
        self.reroll_fee
    }

    /// Natural refresh: new stock, fee back to base.
    pub fn refresh(&mut self, catalog: &Catalog, dice: &mut Dice) {
        self.restock(catalog, dice);
        self.reroll_fee = BASE_REROLL_FEE;
        self.needs_refresh = false;
        info!(offers = self.offers.len(), "shop refreshed");
    }

    /// Refresh only if marked.
    pub fn refresh_if_needed(&mut self, catalog: &Catalog, dice: &mut Dice) -> bool {
        if !self.needs_refresh {
            return false;
        }
        self.refresh(catalog, dice);
        true
    }

    /// Paid refresh. The fee doubles after each successful reroll.
    pub fn reroll<W: Wallet + ?Sized>(
        &mut self,
        catalog: &Catalog,
        dice: &mut Dice,
        wallet: &mut W,
    ) -> Result<i32, GameError> {
        let fee = self.reroll_fee;
        wallet.try_spend(fee)?;
        self.restock(catalog, dice);
        self.reroll_fee = fee.saturating_mul(2);
        self.needs_refresh = false;
        info!(fee, next_fee = self.reroll_fee, "shop rerolled");
        Ok(fee)
    }

    fn restock(&mut self, catalog: &Catalog, dice: &mut Dice) {
        self.offers.clear();
        let pools = catalog.ids_by_rarity();
        let distinct = catalog.len();
        if distinct == 0 {
            warn!("shop restock with an empty catalog");
            return;
        }

        let mut picked: Vec<i32> = Vec::with_capacity(SHOP_SLOTS);
        let mut draws = 0;
        while picked.len() < SHOP_SLOTS && draws < MAX_DRAWS {
            draws += 1;
            let Some(tid) = draw_template(&pools, dice) else { break };
            if distinct < SHOP_SLOTS || !picked.contains(&tid) {
                picked.push(tid);
            }
        }
        if picked.len() < SHOP_SLOTS && distinct >= SHOP_SLOTS {
            let unused: Vec<i32> = catalog
                .iter()
                .map(Equipment::template_id)
                .filter(|tid| !picked.contains(tid))
                .collect();
            picked.extend(unused.into_iter().take(SHOP_SLOTS - picked.len()));
        }

        self.offers = picked
            .into_iter()
            .filter_map(|tid| catalog.clone_prototype(tid, 1))
            .map(ShopOffer::new)
            .collect();
    }

    /// Buy the offer at `index`, moving its item into `inventory`.
    pub fn purchase<W: Wallet + ?Sized>(
        &mut self,
        index: usize,
        wallet: &mut W,
        inventory: &mut Inventory,
    ) -> Result<ItemKey, GameError> {
        let offer = self
            .offers
            .get(index)
            .ok_or(GameError::InvalidSelection { index, len: self.offers.len() })?;
        wallet.try_spend(offer.price)?;
        let offer = self.offers.remove(index);
        info!(item = offer.item.name(), price = offer.price, "shop purchase");
        Ok(inventory.insert(offer.item))
    }

    pub fn to_record(&self) -> ShopRecord {
        ShopRecord {
            needs_refresh: self.needs_refresh,
            manual_refresh_cost: self.reroll_fee,
            items: self
                .offers
                .iter()
                .map(|o| ShopItemRecord {
                    equipment_id: o.item.template_id(),
                    equipment_level: o.item.level(),
                    price: o.price,
                })
                .collect(),
        }
    }

    /// Rebuild a shop from its record, dropping offers the catalog no longer knows.
    /// Saved levels are clamped to `[1, max_level]`.
    pub fn from_record(record: &ShopRecord, catalog: &Catalog) -> Self {
        let offers = record
            .items
            .iter()
            .filter_map(|r| {
                let Some(proto) = catalog.prototype(r.equipment_id) else {
                    warn!(tid = r.equipment_id, "saved shop offer references unknown template");
                    return None;
                };
                let level = r.equipment_level.clamp(1, proto.max_level());
                catalog
                    .clone_prototype(r.equipment_id, level)
                    .map(|item| ShopOffer { item, price: r.price })
            })
            .collect();
        Self {
            offers,
            needs_refresh: record.needs_refresh,
            reroll_fee: if record.manual_refresh_cost > 0 {
                record.manual_refresh_cost
            } else {
                BASE_REROLL_FEE
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_table_boundaries() {
        assert_eq!(rarity_for_roll(0), Rarity::Broken);
        assert_eq!(rarity_for_roll(49), Rarity::Broken);
        assert_eq!(rarity_for_roll(50), Rarity::Standard);
        assert_eq!(rarity_for_roll(79), Rarity::Standard);
        assert_eq!(rarity_for_roll(80), Rarity::Military);
        assert_eq!(rarity_for_roll(94), Rarity::Military);
        assert_eq!(rarity_for_roll(95), Rarity::Legendary);
        assert_eq!(rarity_for_roll(99), Rarity::Legendary);
    }

    #[test]
    fn empty_pool_falls_back_to_standard_first() {
        let pools = [vec![], vec![7], vec![8], vec![]];
        // roll 0 → Broken (empty) → Standard
        let mut dice = Dice::from_scripted(vec![0]);
        assert_eq!(draw_template(&pools, &mut dice), Some(7));

        let pools = [vec![5], vec![], vec![8], vec![]];
        let mut dice = Dice::from_scripted(vec![99]);
        assert_eq!(draw_template(&pools, &mut dice), Some(5));
    }

    #[test]
    fn all_pools_empty_draws_nothing() {
        let pools: [Vec<i32>; 4] = Default::default();
        let mut dice = Dice::from_scripted(vec![10]);
        assert_eq!(draw_template(&pools, &mut dice), None);
    }

    #[test]
    fn prices_scale_with_rarity() {
        assert_eq!(price_for(Rarity::Broken), 500);
        assert_eq!(price_for(Rarity::Legendary), 2000);
    }
}
