use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest level a playable item can reach.
pub const MAX_LEVEL: u8 = 3;
/// Level carried by catalog prototypes.
pub const PROTOTYPE_LEVEL: u8 = 0;

const COMBINE_PREFIX: &str = "Enhanced-";
const ARMOR_CLONE_HP_BONUS: i32 = 200;
const ARMOR_CLONE_CAPACITY_BONUS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Broken,
    Standard,
    Military,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] =
        [Rarity::Broken, Rarity::Standard, Rarity::Military, Rarity::Legendary];

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// `ordinal + 1`; scales upgrade costs and shop prices.
    pub fn multiplier(self) -> i32 {
        self.ordinal() + 1
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(ordinal).ok()?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Broken => "Broken",
            Rarity::Standard => "Standard",
            Rarity::Military => "Military",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BROKEN" => Ok(Rarity::Broken),
            "STANDARD" => Ok(Rarity::Standard),
            "MILITARY" => Ok(Rarity::Military),
            "LEGENDARY" => Ok(Rarity::Legendary),
            other => Err(format!("unknown rarity '{}'", other)),
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Weapon,
    Armor,
}

impl fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipmentKind::Weapon => f.write_str("a weapon"),
            EquipmentKind::Armor => f.write_str("an armor"),
        }
    }
}

/// `base * (1 + 0.2 * (level - 1))`, rounded. The factor is `(4 + level) / 5`,
/// so the result never lands on a .5 tie.
fn scale(base: i32, level: u8) -> i32 {
    (base as f64 * (4 + i32::from(level)) as f64 / 5.0).round() as i32
}

fn scale_rate(base: i32, level: u8) -> i32 {
    scale(base, level).clamp(0, 100)
}

/// Attack speed counts rounds per strike, so levelling divides it.
fn scale_speed(base: i32, level: u8) -> i32 {
    let speed = (base as f64 * 5.0 / (4 + i32::from(level)) as f64).round() as i32;
    speed.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub atk: i32,
    pub crit_rate: i32,
    pub atk_speed: i32,
    pub weight: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorStats {
    pub max_hp: i32,
    pub dodge_rate: i32,
    pub capacity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub template_id: i32,
    pub name: String,
    pub rarity: Rarity,
    pub level: u8,
    pub faction: String,
    /// Level-1 values.
    pub base: WeaponStats,
}

impl Weapon {
    pub fn new(
        template_id: i32,
        name: impl Into<String>,
        rarity: Rarity,
        level: u8,
        faction: impl Into<String>,
        base: WeaponStats,
    ) -> Self {
        Self {
            template_id,
            name: name.into(),
            rarity,
            level,
            faction: faction.into(),
            base,
        }
    }

    pub fn stats_at(&self, level: u8) -> WeaponStats {
        WeaponStats {
            atk: scale(self.base.atk, level),
            crit_rate: scale_rate(self.base.crit_rate, level),
            atk_speed: scale_speed(self.base.atk_speed, level),
            weight: self.base.weight,
        }
    }

    pub fn stats(&self) -> WeaponStats {
        self.stats_at(self.level)
    }

    pub fn atk(&self) -> i32 {
        self.stats().atk
    }

    pub fn crit_rate(&self) -> i32 {
        self.stats().crit_rate
    }

    pub fn atk_speed(&self) -> i32 {
        self.stats().atk_speed
    }

    pub fn weight(&self) -> i32 {
        self.base.weight
    }

    pub fn max_level(&self) -> u8 {
        MAX_LEVEL
    }

    pub fn power(&self) -> i32 {
        let s = self.stats();
        let power = s.atk as f64
            * (1.0 + s.crit_rate as f64 / 200.0)
            * (10.0 / s.atk_speed as f64)
            * f64::from(self.level);
        power as i32
    }

    /// Copy at a new name/level. Cloning a weapon boosts its base attack by half.
    pub fn clone_as(&self, name: impl Into<String>, level: u8) -> Self {
        let base = WeaponStats {
            atk: (self.base.atk as f64 * 1.5) as i32,
            ..self.base
        };
        Self::new(self.template_id, name, self.rarity, level, self.faction.clone(), base)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    pub template_id: i32,
    pub name: String,
    pub rarity: Rarity,
    pub level: u8,
    pub faction: String,
    /// Level-1 values.
    pub base: ArmorStats,
}

impl Armor {
    pub fn new(
        template_id: i32,
        name: impl Into<String>,
        rarity: Rarity,
        level: u8,
        faction: impl Into<String>,
        base: ArmorStats,
    ) -> Self {
        Self {
            template_id,
            name: name.into(),
            rarity,
            level,
            faction: faction.into(),
            base,
        }
    }

    pub fn stats_at(&self, level: u8) -> ArmorStats {
        ArmorStats {
            max_hp: scale(self.base.max_hp, level),
            dodge_rate: scale_rate(self.base.dodge_rate, level),
            capacity: scale(self.base.capacity, level),
        }
    }

    pub fn stats(&self) -> ArmorStats {
        self.stats_at(self.level)
    }

    pub fn max_hp(&self) -> i32 {
        self.stats().max_hp
    }

    pub fn dodge_rate(&self) -> i32 {
        self.stats().dodge_rate
    }

    pub fn capacity(&self) -> i32 {
        self.stats().capacity
    }

    pub fn max_level(&self) -> u8 {
        MAX_LEVEL
    }

    pub fn power(&self) -> i32 {
        let s = self.stats();
        s.max_hp / 10 + s.dodge_rate * 2 + s.capacity + i32::from(self.level) * 5
    }

    /// Copy at a new name/level. Cloning an armor adds +200 base HP and +5 base capacity.
    pub fn clone_as(&self, name: impl Into<String>, level: u8) -> Self {
        let base = ArmorStats {
            max_hp: self.base.max_hp + ARMOR_CLONE_HP_BONUS,
            capacity: self.base.capacity + ARMOR_CLONE_CAPACITY_BONUS,
            ..self.base
        };
        Self::new(self.template_id, name, self.rarity, level, self.faction.clone(), base)
    }
}

/// Stats an item would have one level up; see [`Equipment::preview_next_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatPreview {
    Weapon(WeaponStats),
    Armor(ArmorStats),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Equipment {
    Weapon(Weapon),
    Armor(Armor),
}

impl Equipment {
    pub fn kind(&self) -> EquipmentKind {
        match self {
            Equipment::Weapon(_) => EquipmentKind::Weapon,
            Equipment::Armor(_) => EquipmentKind::Armor,
        }
    }

    pub fn template_id(&self) -> i32 {
        match self {
            Equipment::Weapon(w) => w.template_id,
            Equipment::Armor(a) => a.template_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Equipment::Weapon(w) => &w.name,
            Equipment::Armor(a) => &a.name,
        }
    }

    pub fn rarity(&self) -> Rarity {
        match self {
            Equipment::Weapon(w) => w.rarity,
            Equipment::Armor(a) => a.rarity,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Equipment::Weapon(w) => w.level,
            Equipment::Armor(a) => a.level,
        }
    }

    pub fn faction(&self) -> &str {
        match self {
            Equipment::Weapon(w) => &w.faction,
            Equipment::Armor(a) => &a.faction,
        }
    }

    pub fn max_level(&self) -> u8 {
        match self {
            Equipment::Weapon(w) => w.max_level(),
            Equipment::Armor(a) => a.max_level(),
        }
    }

    pub fn can_level_up(&self) -> bool {
        self.level() < self.max_level()
    }

    pub fn upgrade_cost(&self) -> i32 {
        10 * self.rarity().multiplier()
    }

    /// Raise the level by one. At max level nothing changes and `false` is returned;
    /// charging for the upgrade is the caller's business.
    pub fn level_up(&mut self) -> bool {
        if !self.can_level_up() {
            return false;
        }
        match self {
            Equipment::Weapon(w) => w.level += 1,
            Equipment::Armor(a) => a.level += 1,
        }
        true
    }

    pub fn preview_next_level(&self) -> Option<StatPreview> {
        if !self.can_level_up() {
            return None;
        }
        let next = self.level() + 1;
        Some(match self {
            Equipment::Weapon(w) => StatPreview::Weapon(w.stats_at(next)),
            Equipment::Armor(a) => StatPreview::Armor(a.stats_at(next)),
        })
    }

    pub fn power(&self) -> i32 {
        match self {
            Equipment::Weapon(w) => w.power(),
            Equipment::Armor(a) => a.power(),
        }
    }

    pub fn clone_as(&self, name: impl Into<String>, level: u8) -> Self {
        match self {
            Equipment::Weapon(w) => Equipment::Weapon(w.clone_as(name, level)),
            Equipment::Armor(a) => Equipment::Armor(a.clone_as(name, level)),
        }
    }

    /// Fuse two items into a new one built from `self`: level is one above the
    /// higher of the two, name gains the enhanced prefix. `other` only
    /// contributes its level.
    ///
    /// The level is deliberately capped at max level: every item stays in
    /// `[1, max_level]`.
    pub fn combine(&self, other: &Equipment) -> Equipment {
        let level = self.level().max(other.level()).saturating_add(1).min(self.max_level());
        self.clone_as(format!("{}{}", COMBINE_PREFIX, self.name()), level)
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match self {
            Equipment::Weapon(w) => Some(w),
            Equipment::Armor(_) => None,
        }
    }

    pub fn as_armor(&self) -> Option<&Armor> {
        match self {
            Equipment::Armor(a) => Some(a),
            Equipment::Weapon(_) => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Equipment::Weapon(w) => {
                let s = w.stats();
                format!(
                    "[Weapon] ATK {} | CRIT {}% | SPD {} | WT {} | {}",
                    s.atk, s.crit_rate, s.atk_speed, s.weight, w.faction
                )
            }
            Equipment::Armor(a) => {
                let s = a.stats();
                format!(
                    "[Armor] HP {} | DODGE {}% | CAP {} | {}",
                    s.max_hp, s.dodge_rate, s.capacity, a.faction
                )
            }
        }
    }
}

impl Add for &Equipment {
    type Output = Equipment;

    fn add(self, rhs: &Equipment) -> Equipment {
        self.combine(rhs)
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Lv.{}/{} ({})", self.name(), self.level(), self.max_level(), self.rarity())
    }
}

impl From<Weapon> for Equipment {
    fn from(w: Weapon) -> Self {
        Equipment::Weapon(w)
    }
}

impl From<Armor> for Equipment {
    fn from(a: Armor) -> Self {
        Equipment::Armor(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_matches_level_factor() {
        assert_eq!(scale(10, 1), 10);
        assert_eq!(scale(10, 2), 12);
        assert_eq!(scale(10, 3), 14);
        assert_eq!(scale(7, 2), 8); // 8.4
        assert_eq!(scale(8, 3), 11); // 11.2
        assert_eq!(scale(9, 3), 13); // 12.6
        assert_eq!(scale(10, 0), 8);
    }

    #[test]
    fn speed_divides_and_floors_at_one() {
        assert_eq!(scale_speed(3, 1), 3);
        assert_eq!(scale_speed(3, 2), 3); // 2.5 rounds up
        assert_eq!(scale_speed(3, 3), 2); // 2.14
        assert_eq!(scale_speed(1, 3), 1);
        assert_eq!(scale_speed(0, 1), 1);
    }

    #[test]
    fn rates_clamp() {
        assert_eq!(scale_rate(90, 3), 100);
        assert_eq!(scale_rate(-5, 1), 0);
    }
}
