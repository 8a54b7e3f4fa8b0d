//! One battle: the player's equipped weapons against a single monster.
//!
//! `Engage → PlayerTurn → EnemyTurn → (PlayerTurn | Victory | Defeat)`. Each
//! [`Battle::step`] performs one transition, so callers can either drive it
//! turn by turn or let [`Battle::run`] play it out.

use serde::Serialize;
use tracing::debug;

use crate::Dice;
use crate::catalog::{Bestiary, MonsterTemplate};
use crate::equipment::{Armor, Weapon};
use crate::error::GameError;
use crate::inventory::{EquipmentSlot, Inventory, effective_dodge};
use crate::ledger::AdventureStats;
use crate::life::{Health, apply_damage};

/// A stalemate (e.g. only zero-attack weapons) ends in defeat after this many rounds.
pub const MAX_ROUNDS: u32 = 1000;

const PLAYER: &str = "Player";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Monster {
    pub id: i32,
    pub name: String,
    pub hp: i32,
    pub atk: i32,
    pub exp: i32,
}

impl Monster {
    /// Scale a template to `difficulty`: +5% HP/ATK and +10% EXP per level, rounded down.
    pub fn from_template(template: &MonsterTemplate, difficulty: u32) -> Self {
        let d = i64::from(difficulty);
        let scale = |value: i32, percent_per_level: i64| -> i32 {
            (i64::from(value) * (100 + percent_per_level * d) / 100) as i32
        };
        Self {
            id: template.id,
            name: template.name.clone(),
            hp: scale(template.hp, 5),
            atk: scale(template.atk, 5),
            exp: scale(template.exp, 10),
        }
    }
}

/// Borrowed view of what the player brings into a fight.
#[derive(Debug, Clone, Default)]
pub struct Gear<'a> {
    pub armor: Option<&'a Armor>,
    pub weapons: Vec<&'a Weapon>,
}

impl<'a> Gear<'a> {
    pub fn from_loadout(slot: &EquipmentSlot, inventory: &'a Inventory) -> Self {
        Self {
            armor: slot.armor(inventory),
            weapons: slot.weapons(inventory),
        }
    }

    pub fn total_weight(&self) -> i32 {
        self.weapons.iter().map(|w| w.weight()).sum()
    }

    pub fn effective_dodge(&self) -> i32 {
        effective_dodge(self.armor, self.total_weight())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattlePhase {
    Engage,
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub rounds: u32,
    /// The monster as it was drawn (scaled, full HP).
    pub monster: Monster,
    pub monster_hp_end: i32,
    pub damage_taken: i32,
    pub exp_reward: i32,
    pub log: Vec<String>,
}

pub struct Battle {
    drawn: Monster,
    monster: Monster,
    phase: BattlePhase,
    round: u32,
    damage_taken: i32,
    log: Vec<String>,
}

impl Battle {
    pub fn new(monster: Monster) -> Self {
        Self {
            drawn: monster.clone(),
            monster,
            phase: BattlePhase::Engage,
            round: 0,
            damage_taken: 0,
            log: Vec::new(),
        }
    }

    /// Draw a monster uniformly from the bestiary and scale it to `difficulty`.
    pub fn engage(
        bestiary: &Bestiary,
        difficulty: u32,
        dice: &mut Dice,
    ) -> Result<Self, GameError> {
        if bestiary.is_empty() {
            return Err(GameError::NoMonsters);
        }
        let template = &bestiary.monsters()[dice.index(bestiary.len())];
        Ok(Self::new(Monster::from_template(template, difficulty)))
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn monster(&self) -> &Monster {
        &self.monster
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, BattlePhase::Victory | BattlePhase::Defeat)
    }

    /// Perform one state transition and return the new phase.
    pub fn step(
        &mut self,
        gear: &Gear<'_>,
        health: &mut Health,
        stats: &mut AdventureStats,
        dice: &mut Dice,
    ) -> BattlePhase {
        self.phase = match self.phase {
            BattlePhase::Engage => {
                self.log.push(format!(
                    "[START] {} (HP {}, ATK {}, EXP {}) vs {} (HP {}/{})",
                    self.monster.name,
                    self.monster.hp,
                    self.monster.atk,
                    self.monster.exp,
                    PLAYER,
                    health.hp,
                    health.max_hp
                ));
                self.round = 1;
                BattlePhase::PlayerTurn
            }
            BattlePhase::PlayerTurn => self.player_turn(gear, health, stats, dice),
            BattlePhase::EnemyTurn => self.enemy_turn(gear, health, dice),
            done @ (BattlePhase::Victory | BattlePhase::Defeat) => done,
        };
        self.phase
    }

    fn player_turn(
        &mut self,
        gear: &Gear<'_>,
        health: &mut Health,
        stats: &mut AdventureStats,
        dice: &mut Dice,
    ) -> BattlePhase {
        self.log.push(format!("[ROUND] {} → {}", self.round, PLAYER));
        if gear.weapons.is_empty() {
            self.log.push(format!("[TURN][{}] no weapon equipped; forced retreat", PLAYER));
            health.hp = 0;
            return BattlePhase::Defeat;
        }

        for weapon in &gear.weapons {
            let crit_rate = weapon.crit_rate();
            let (roll, crit) = dice.chance(crit_rate);
            let atk = weapon.atk().max(0);
            let damage = if crit { atk * 2 } else { atk };
            let before = self.monster.hp;
            self.monster.hp = (self.monster.hp - damage).max(0);
            stats.record_hit(&weapon.name, damage);
            self.log.push(format!(
                "[ATTACK][{}] d100={} vs crit {}% → {} {}",
                weapon.name,
                roll,
                crit_rate,
                if crit { "CRIT!" } else { "HIT" },
                damage
            ));
            self.log
                .push(format!("[HP][{}] {} → {}", self.monster.name, before, self.monster.hp));
            debug!(weapon = %weapon.name, damage, crit, monster_hp = self.monster.hp, "strike");

            if self.monster.hp <= 0 {
                stats.exp_gained += self.monster.exp;
                stats.enemies_defeated += 1;
                self.log.push(format!(
                    "[END] {} defeated in {} rounds, +{} EXP",
                    self.monster.name, self.round, self.monster.exp
                ));
                return BattlePhase::Victory;
            }
        }
        BattlePhase::EnemyTurn
    }

    fn enemy_turn(&mut self, gear: &Gear<'_>, health: &mut Health, dice: &mut Dice) -> BattlePhase {
        self.log.push(format!("[ROUND] {} → {}", self.round, self.monster.name));
        let dodge = gear.effective_dodge();
        let (roll, dodged) = dice.chance(dodge);
        if dodged {
            self.log
                .push(format!("[DODGE][{}] d100={} vs dodge {}% → MISS", PLAYER, roll, dodge));
        } else {
            let hit = self.monster.atk.max(0);
            self.log.push(format!(
                "[ATTACK][{}] d100={} vs dodge {}% → HIT {}",
                self.monster.name, roll, dodge, hit
            ));
            self.damage_taken += hit;
            let log = &mut self.log;
            if apply_damage(PLAYER, health, hit, |msg| log.push(msg)) {
                self.log.push(format!("[END] {} falls to {}", PLAYER, self.monster.name));
                return BattlePhase::Defeat;
            }
        }
        debug!(dodged, player_hp = health.hp, "enemy turn");

        if self.round >= MAX_ROUNDS {
            self.log.push(format!(
                "[END] stalemate after {} rounds; {} retreats",
                self.round, PLAYER
            ));
            return BattlePhase::Defeat;
        }
        self.round += 1;
        BattlePhase::PlayerTurn
    }

    /// Step until Victory or Defeat.
    pub fn run(
        mut self,
        gear: &Gear<'_>,
        health: &mut Health,
        stats: &mut AdventureStats,
        dice: &mut Dice,
    ) -> BattleReport {
        while !self.is_over() {
            self.step(gear, health, stats, dice);
        }
        let outcome = if self.phase == BattlePhase::Victory {
            BattleOutcome::Victory
        } else {
            BattleOutcome::Defeat
        };
        BattleReport {
            outcome,
            rounds: self.round,
            exp_reward: if outcome == BattleOutcome::Victory { self.drawn.exp } else { 0 },
            monster: self.drawn,
            monster_hp_end: self.monster.hp,
            damage_taken: self.damage_taken,
            log: self.log,
        }
    }
}
