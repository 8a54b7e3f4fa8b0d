use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub hp: i32,
    pub max_hp: i32,
}

impl Health {
    /// Full health. Max HP is floored at 1 so every run can end in defeat.
    pub fn new(max_hp: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self { hp: max_hp, max_hp }
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    /// HP missing from full.
    pub fn deficit(&self) -> i32 {
        (self.max_hp - self.hp).max(0)
    }

    /// New maximum (armor swap or upgrade) and a full heal.
    pub fn reset_max(&mut self, max_hp: i32) {
        *self = Self::new(max_hp);
    }

    pub fn restore_full(&mut self) {
        self.hp = self.max_hp;
    }
}

/// Apply damage. Negative damage counts as 0. Returns true if the creature
/// dropped to 0 this call.
pub fn apply_damage(
    name: &str,
    health: &mut Health,
    dmg: i32,
    mut log: impl FnMut(String),
) -> bool {
    if health.is_down() {
        return false;
    }
    let dmg = dmg.max(0);
    let before = health.hp;
    health.hp = (health.hp - dmg).max(0);
    log(format!("[DMG][{}] {} → {} (−{})", name, before, health.hp, dmg));
    if health.hp == 0 {
        log(format!("[STATE][{}] drops to 0 HP", name));
        return true;
    }
    false
}
