//! Greedy stand-in for a human at the adventure menus.

use steelsoul_engine::{
    AdventureRun, CheckpointAction, ItemKey, Pilot, Player, RepairChoice, RunEvent,
};
use tracing::debug;

use crate::render;

/// Wear the strongest armor, then add weapons by power while capacity allows.
/// Returns the number of weapons equipped.
pub fn auto_equip(player: &mut Player) -> usize {
    if player.loadout.armor_key().is_none() {
        let best = player
            .inventory
            .armors()
            .max_by_key(|(_, a)| (a.capacity(), a.max_hp()))
            .map(|(k, _)| k);
        if let Some(key) = best {
            if let Err(e) = player.equip_armor(key) {
                debug!("auto-equip armor skipped: {}", e);
            }
        }
    }

    let mut weapons: Vec<(ItemKey, i32)> = player
        .inventory
        .weapons()
        .filter(|(k, _)| !player.loadout.is_equipped(*k))
        .map(|(k, w)| (k, w.power()))
        .collect();
    weapons.sort_by(|a, b| b.1.cmp(&a.1));
    for (key, _) in weapons {
        // over-capacity and missing-armor rejections just mean "skip this one"
        let _ = player.equip_weapon(key);
    }
    player.loadout.weapon_keys().len()
}

#[derive(Debug, Clone)]
pub struct AutoPilot {
    /// Return to base after this many checkpoints.
    pub max_checkpoints: u32,
    /// EXP the pilot will not spend on upgrades.
    pub reserve: i32,
    /// Repair when HP falls below this percentage of max.
    pub repair_below_percent: i32,
    /// Print events to stdout.
    pub verbose: bool,
    /// Also print every battle transcript line.
    pub transcripts: bool,
    stuck: bool,
}

impl Default for AutoPilot {
    fn default() -> Self {
        Self {
            max_checkpoints: 3,
            reserve: 0,
            repair_below_percent: 60,
            verbose: false,
            transcripts: false,
            stuck: false,
        }
    }
}

impl AutoPilot {
    pub fn new(max_checkpoints: u32) -> Self {
        Self { max_checkpoints, ..Self::default() }
    }

    /// Cheapest affordable upgrade among worn items.
    fn pick_upgrade(&self, run: &AdventureRun<'_>) -> Option<ItemKey> {
        let player = run.player();
        let budget = run.available_exp() - self.reserve;
        let worn = player
            .loadout
            .armor_key()
            .into_iter()
            .chain(player.loadout.weapon_keys().iter().copied());
        worn.filter_map(|k| player.inventory.get(k).map(|item| (k, item)))
            .filter(|(_, item)| item.can_level_up() && item.upgrade_cost() <= budget)
            .min_by_key(|(_, item)| item.upgrade_cost())
            .map(|(k, _)| k)
    }
}

impl Pilot for AutoPilot {
    fn repair(&mut self, run: &AdventureRun<'_>) -> RepairChoice {
        let health = run.health();
        if health.hp * 100 >= health.max_hp * self.repair_below_percent {
            return RepairChoice::Skip;
        }
        if run.available_exp() >= health.deficit() {
            RepairChoice::Full
        } else {
            RepairChoice::Partial(run.available_exp())
        }
    }

    fn checkpoint(&mut self, run: &AdventureRun<'_>) -> CheckpointAction {
        if !self.stuck {
            if let Some(key) = self.pick_upgrade(run) {
                return CheckpointAction::Upgrade(key);
            }
        }
        self.stuck = false;
        if run.stats().checkpoints_reached >= self.max_checkpoints {
            CheckpointAction::Abort
        } else {
            CheckpointAction::Continue
        }
    }

    fn observe(&mut self, event: &RunEvent<'_>) {
        if let RunEvent::Rejected { .. } = event {
            self.stuck = true;
        }
        if !self.verbose {
            return;
        }
        if let RunEvent::Battle(report) = event {
            if self.transcripts {
                for line in &report.log {
                    println!("    {}", line);
                }
            }
        }
        if let Some(line) = render::event_line(event) {
            println!("{}", line);
        }
    }
}
