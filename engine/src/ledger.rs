use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponTally {
    pub total_damage: i32,
    pub hits: u32,
}

/// Run-scoped record of experience earned and spent, settled into the
/// player's banked experience only when the run ends.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdventureStats {
    pub exp_gained: i32,
    pub exp_spent: i32,
    pub enemies_defeated: u32,
    pub checkpoints_reached: u32,
    /// Keyed by weapon name; same-named weapons share a tally.
    pub weapon_damage: IndexMap<String, WeaponTally>,
}

impl AdventureStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self, weapon_name: &str, damage: i32) {
        let tally = self.weapon_damage.entry(weapon_name.to_string()).or_default();
        tally.total_damage += damage;
        tally.hits += 1;
    }

    pub fn net_gain(&self) -> i32 {
        self.exp_gained - self.exp_spent
    }

    /// Experience spendable mid-run: banked plus earned, minus already spent.
    pub fn available(&self, persistent_exp: i32) -> i32 {
        persistent_exp + self.exp_gained - self.exp_spent
    }
}
