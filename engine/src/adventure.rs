//! A single adventure: battles with escalating difficulty, checkpoints every
//! few victories, and one settlement of the run ledger when it ends.
//!
//! ```text
//! Battling ──victory──▶ AfterBattle ──countdown left──▶ Battling
//!    │                       └──countdown 0──▶ Checkpoint ──continue──▶ Battling
//!    └──defeat──▶ Ended ◀──────────────────────abort──┘
//! ```
//!
//! The player is lent mutably for the whole run. Banked experience only
//! moves once, on the transition to [`RunPhase::Ended`].

use serde::Serialize;
use tracing::{info, warn};

use crate::Dice;
use crate::catalog::{Bestiary, Catalog};
use crate::combat::{Battle, BattleOutcome, BattleReport, Gear};
use crate::config::RunSettings;
use crate::error::GameError;
use crate::inventory::ItemKey;
use crate::ledger::AdventureStats;
use crate::life::Health;
use crate::player::{Player, RunWallet, UpgradeReceipt, Wallet, upgrade_item};
use crate::shop::{Shop, ShopOffer};

/// Consecutive rejected checkpoint actions before [`AdventureRun::drive`] gives up and aborts.
const MAX_REJECTIONS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Battling,
    AfterBattle,
    Checkpoint,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Defeated,
    /// Left from a checkpoint.
    Returned,
}

/// Snapshot for rendering and pilot decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    pub phase: RunPhase,
    pub hp: i32,
    pub max_hp: i32,
    pub difficulty: u32,
    pub battles_until_checkpoint: u32,
    pub persistent_exp: i32,
    pub exp_gained: i32,
    pub exp_spent: i32,
    pub available_exp: i32,
    pub enemies_defeated: u32,
    pub checkpoints_reached: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub stats: AdventureStats,
    pub final_difficulty: u32,
    pub net_gain: i32,
    /// Banked experience after settlement.
    pub persistent_exp: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairChoice {
    Full,
    Partial(i32),
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointAction {
    EquipArmor(ItemKey),
    EquipWeapon(ItemKey),
    UnequipWeapon(usize),
    Upgrade(ItemKey),
    Buy(usize),
    RerollShop,
    Continue,
    Abort,
}

#[derive(Debug)]
pub enum RunEvent<'e> {
    Battle(&'e BattleReport),
    Repaired { amount: i32, hp: i32, max_hp: i32 },
    RepairRejected(&'e GameError),
    CheckpointReached { checkpoint: u32, difficulty: u32 },
    Applied(&'e CheckpointAction),
    Rejected { action: &'e CheckpointAction, error: &'e GameError },
    Ended(&'e RunSummary),
}

/// Makes the decisions a human would make at the menus.
pub trait Pilot {
    /// Asked after a victory that left the player hurt.
    fn repair(&mut self, run: &AdventureRun<'_>) -> RepairChoice;

    /// Asked repeatedly at a checkpoint until it returns `Continue` or `Abort`.
    fn checkpoint(&mut self, run: &AdventureRun<'_>) -> CheckpointAction;

    fn observe(&mut self, _event: &RunEvent<'_>) {}
}

struct CheckpointShop<'a> {
    shop: &'a mut Shop,
    catalog: &'a Catalog,
}

pub struct AdventureRun<'a> {
    player: &'a mut Player,
    bestiary: &'a Bestiary,
    dice: &'a mut Dice,
    shop: Option<CheckpointShop<'a>>,
    settings: RunSettings,
    health: Health,
    stats: AdventureStats,
    difficulty: u32,
    battles_until_checkpoint: u32,
    phase: RunPhase,
    last_report: Option<BattleReport>,
    summary: Option<RunSummary>,
}

impl<'a> AdventureRun<'a> {
    /// Start a run at full HP. Max HP comes from the worn armor.
    pub fn start(
        player: &'a mut Player,
        bestiary: &'a Bestiary,
        dice: &'a mut Dice,
        settings: RunSettings,
    ) -> Result<Self, GameError> {
        if bestiary.is_empty() {
            return Err(GameError::NoMonsters);
        }
        let max_hp = player.max_hp(settings.default_max_hp).max(1);
        if player.loadout.armor_key().is_none() {
            warn!(default_hp = settings.default_max_hp, "starting a run without armor");
        }
        if player.loadout.weapon_keys().is_empty() {
            warn!("starting a run without weapons");
        }
        info!(player = %player.name, max_hp, exp = player.exp, "adventure started");
        Ok(Self {
            player,
            bestiary,
            dice,
            shop: None,
            settings,
            health: Health::new(max_hp),
            stats: AdventureStats::new(),
            difficulty: 0,
            battles_until_checkpoint: settings.battles_per_checkpoint,
            phase: RunPhase::Battling,
            last_report: None,
            summary: None,
        })
    }

    /// Open `shop` at every checkpoint of this run.
    pub fn with_checkpoint_shop(mut self, shop: &'a mut Shop, catalog: &'a Catalog) -> Self {
        self.shop = Some(CheckpointShop { shop, catalog });
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn player(&self) -> &Player {
        self.player
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn stats(&self) -> &AdventureStats {
        &self.stats
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn available_exp(&self) -> i32 {
        self.stats.available(self.player.exp)
    }

    pub fn last_report(&self) -> Option<&BattleReport> {
        self.last_report.as_ref()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn shop_offers(&self) -> &[ShopOffer] {
        self.shop.as_ref().map(|s| s.shop.offers()).unwrap_or_default()
    }

    pub fn reroll_fee(&self) -> Option<i32> {
        self.shop.as_ref().map(|s| s.shop.reroll_fee())
    }

    pub fn status(&self) -> RunStatus {
        RunStatus {
            phase: self.phase,
            hp: self.health.hp,
            max_hp: self.health.max_hp,
            difficulty: self.difficulty,
            battles_until_checkpoint: self.battles_until_checkpoint,
            persistent_exp: self.player.exp,
            exp_gained: self.stats.exp_gained,
            exp_spent: self.stats.exp_spent,
            available_exp: self.available_exp(),
            enemies_defeated: self.stats.enemies_defeated,
            checkpoints_reached: self.stats.checkpoints_reached,
        }
    }

    fn require(&self, phase: RunPhase) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase(self.phase))
        }
    }

    fn wallet(&mut self) -> RunWallet<'_> {
        RunWallet { persistent_exp: self.player.exp, stats: &mut self.stats }
    }

    /// Fight the next monster.
    pub fn fight(&mut self) -> Result<&BattleReport, GameError> {
        self.require(RunPhase::Battling)?;
        let gear = Gear::from_loadout(&self.player.loadout, &self.player.inventory);
        let battle = Battle::engage(self.bestiary, self.difficulty, self.dice)?;
        let report = battle.run(&gear, &mut self.health, &mut self.stats, self.dice);
        info!(
            monster = %report.monster.name,
            outcome = ?report.outcome,
            rounds = report.rounds,
            hp = self.health.hp,
            "battle finished"
        );

        match report.outcome {
            BattleOutcome::Victory => {
                self.battles_until_checkpoint = self.battles_until_checkpoint.saturating_sub(1);
                self.phase = RunPhase::AfterBattle;
            }
            BattleOutcome::Defeat => self.finish(RunOutcome::Defeated),
        }
        Ok(self.last_report.insert(report))
    }

    /// Restore the whole HP deficit at 1 EXP per HP, or nothing.
    pub fn repair_full(&mut self) -> Result<i32, GameError> {
        self.require(RunPhase::AfterBattle)?;
        let needed = self.health.deficit();
        if needed == 0 {
            return Ok(0);
        }
        self.wallet().try_spend(needed)?;
        self.health.restore_full();
        info!(amount = needed, "full repair");
        Ok(needed)
    }

    /// Restore up to `amount` HP, limited by the deficit and available EXP.
    pub fn repair(&mut self, amount: i32) -> Result<i32, GameError> {
        self.require(RunPhase::AfterBattle)?;
        let amount = amount.min(self.health.deficit()).min(self.available_exp());
        if amount <= 0 {
            return Ok(0);
        }
        self.wallet().debit(amount);
        self.health.hp += amount;
        info!(amount, hp = self.health.hp, "partial repair");
        Ok(amount)
    }

    /// Leave the after-battle menu: on to the next fight, or into a checkpoint.
    pub fn advance(&mut self) -> Result<RunPhase, GameError> {
        self.require(RunPhase::AfterBattle)?;
        if self.battles_until_checkpoint == 0 {
            self.enter_checkpoint();
        } else {
            self.phase = RunPhase::Battling;
        }
        Ok(self.phase)
    }

    fn enter_checkpoint(&mut self) {
        self.stats.checkpoints_reached += 1;
        self.difficulty += 1;
        self.health.restore_full();
        if let Some(cs) = self.shop.as_mut() {
            cs.shop.refresh(cs.catalog, self.dice);
        }
        self.phase = RunPhase::Checkpoint;
        info!(
            checkpoint = self.stats.checkpoints_reached,
            difficulty = self.difficulty,
            "checkpoint reached"
        );
    }

    /// Swap armor. Max HP follows the new armor and HP is refilled.
    pub fn equip_armor(&mut self, key: ItemKey) -> Result<(), GameError> {
        self.require(RunPhase::Checkpoint)?;
        self.player.equip_armor(key)?;
        let max_hp = self.player.max_hp(self.settings.default_max_hp);
        self.health.reset_max(max_hp);
        Ok(())
    }

    pub fn equip_weapon(&mut self, key: ItemKey) -> Result<(), GameError> {
        self.require(RunPhase::Checkpoint)?;
        self.player.equip_weapon(key)
    }

    pub fn unequip_weapon(&mut self, index: usize) -> Result<ItemKey, GameError> {
        self.require(RunPhase::Checkpoint)?;
        self.player.unequip_weapon(index)
    }

    /// Upgrade paid from the run wallet. Upgrading the worn armor refills HP.
    pub fn upgrade(&mut self, key: ItemKey) -> Result<UpgradeReceipt, GameError> {
        self.require(RunPhase::Checkpoint)?;
        let mut wallet = RunWallet { persistent_exp: self.player.exp, stats: &mut self.stats };
        let receipt = upgrade_item(&mut self.player.inventory, key, &mut wallet)?;
        if self.player.loadout.armor_key() == Some(key) {
            let max_hp = self.player.max_hp(self.settings.default_max_hp);
            self.health.reset_max(max_hp);
        }
        Ok(receipt)
    }

    pub fn buy(&mut self, index: usize) -> Result<ItemKey, GameError> {
        self.require(RunPhase::Checkpoint)?;
        let cs = self.shop.as_mut().ok_or(GameError::NoShop)?;
        let mut wallet = RunWallet { persistent_exp: self.player.exp, stats: &mut self.stats };
        cs.shop.purchase(index, &mut wallet, &mut self.player.inventory)
    }

    /// Returns the fee paid.
    pub fn reroll_shop(&mut self) -> Result<i32, GameError> {
        self.require(RunPhase::Checkpoint)?;
        let cs = self.shop.as_mut().ok_or(GameError::NoShop)?;
        let mut wallet = RunWallet { persistent_exp: self.player.exp, stats: &mut self.stats };
        cs.shop.reroll(cs.catalog, self.dice, &mut wallet)
    }

    pub fn continue_run(&mut self) -> Result<(), GameError> {
        self.require(RunPhase::Checkpoint)?;
        self.battles_until_checkpoint = self.settings.battles_per_checkpoint;
        self.phase = RunPhase::Battling;
        Ok(())
    }

    /// Return to base from a checkpoint. Calling it again once ended returns the same summary.
    pub fn abort(&mut self) -> Result<&RunSummary, GameError> {
        match self.phase {
            RunPhase::Checkpoint => self.finish(RunOutcome::Returned),
            RunPhase::Ended => {}
            other => return Err(GameError::WrongPhase(other)),
        }
        self.summary.as_ref().ok_or(GameError::WrongPhase(self.phase))
    }

    /// Settle the ledger into banked experience. Runs once per adventure.
    fn finish(&mut self, outcome: RunOutcome) {
        if self.summary.is_some() {
            return;
        }
        let net_gain = self.stats.net_gain();
        self.player.exp += net_gain;
        self.phase = RunPhase::Ended;
        info!(
            ?outcome,
            net_gain,
            exp = self.player.exp,
            enemies = self.stats.enemies_defeated,
            "adventure ended"
        );
        self.summary = Some(RunSummary {
            outcome,
            stats: self.stats.clone(),
            final_difficulty: self.difficulty,
            net_gain,
            persistent_exp: self.player.exp,
        });
    }

    pub fn apply(&mut self, action: CheckpointAction) -> Result<(), GameError> {
        match action {
            CheckpointAction::EquipArmor(key) => self.equip_armor(key),
            CheckpointAction::EquipWeapon(key) => self.equip_weapon(key),
            CheckpointAction::UnequipWeapon(index) => self.unequip_weapon(index).map(|_| ()),
            CheckpointAction::Upgrade(key) => self.upgrade(key).map(|_| ()),
            CheckpointAction::Buy(index) => self.buy(index).map(|_| ()),
            CheckpointAction::RerollShop => self.reroll_shop().map(|_| ()),
            CheckpointAction::Continue => self.continue_run(),
            CheckpointAction::Abort => self.abort().map(|_| ()),
        }
    }

    /// Play the run to the end, asking `pilot` at every menu.
    pub fn drive<P: Pilot + ?Sized>(&mut self, pilot: &mut P) -> Result<RunSummary, GameError> {
        let mut rejections = 0;
        loop {
            match self.phase {
                RunPhase::Battling => {
                    let report = self.fight()?;
                    pilot.observe(&RunEvent::Battle(report));
                }
                RunPhase::AfterBattle => {
                    if self.health.deficit() > 0 {
                        let repaired = match pilot.repair(self) {
                            RepairChoice::Full => Some(self.repair_full()),
                            RepairChoice::Partial(amount) => Some(self.repair(amount)),
                            RepairChoice::Skip => None,
                        };
                        match repaired {
                            Some(Ok(amount)) if amount > 0 => pilot.observe(&RunEvent::Repaired {
                                amount,
                                hp: self.health.hp,
                                max_hp: self.health.max_hp,
                            }),
                            Some(Err(e)) => pilot.observe(&RunEvent::RepairRejected(&e)),
                            _ => {}
                        }
                    }
                    if self.advance()? == RunPhase::Checkpoint {
                        pilot.observe(&RunEvent::CheckpointReached {
                            checkpoint: self.stats.checkpoints_reached,
                            difficulty: self.difficulty,
                        });
                    }
                }
                RunPhase::Checkpoint => {
                    let action = pilot.checkpoint(self);
                    match self.apply(action) {
                        Ok(()) => {
                            rejections = 0;
                            pilot.observe(&RunEvent::Applied(&action));
                        }
                        Err(error) => {
                            rejections += 1;
                            pilot.observe(&RunEvent::Rejected { action: &action, error: &error });
                            if rejections >= MAX_REJECTIONS {
                                warn!(
                                    rejections,
                                    "pilot keeps choosing rejected actions; returning to base"
                                );
                                self.abort()?;
                            }
                        }
                    }
                }
                RunPhase::Ended => {
                    let summary = self.summary.clone().ok_or(GameError::WrongPhase(self.phase))?;
                    pilot.observe(&RunEvent::Ended(&summary));
                    return Ok(summary);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MonsterTemplate;

    fn bestiary() -> Bestiary {
        Bestiary::new(vec![MonsterTemplate { id: 1, name: "Husk".into(), hp: 10, atk: 5, exp: 20 }])
    }

    #[test]
    fn empty_bestiary_refuses_to_start() {
        let mut player = Player::new("p");
        let mut dice = Dice::from_scripted(vec![100]);
        let empty = Bestiary::default();
        let err = AdventureRun::start(&mut player, &empty, &mut dice, RunSettings::default()).err();
        assert_eq!(err, Some(GameError::NoMonsters));
    }

    #[test]
    fn bare_player_uses_default_hp() {
        let mut player = Player::new("p");
        let mut dice = Dice::from_scripted(vec![100]);
        let beasts = bestiary();
        let run =
            AdventureRun::start(&mut player, &beasts, &mut dice, RunSettings::default()).unwrap();
        assert_eq!(run.health(), Health::new(100));
        assert_eq!(run.phase(), RunPhase::Battling);
    }

    #[test]
    fn checkpoint_actions_need_a_checkpoint() {
        let mut player = Player::new("p");
        let mut dice = Dice::from_scripted(vec![100]);
        let beasts = bestiary();
        let mut run =
            AdventureRun::start(&mut player, &beasts, &mut dice, RunSettings::default()).unwrap();
        assert_eq!(run.continue_run(), Err(GameError::WrongPhase(RunPhase::Battling)));
        assert_eq!(run.abort().err(), Some(GameError::WrongPhase(RunPhase::Battling)));
        assert_eq!(run.repair(5), Err(GameError::WrongPhase(RunPhase::Battling)));
    }
}
