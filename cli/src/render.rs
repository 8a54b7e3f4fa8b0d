use steelsoul_engine::{
    BattleOutcome, Equipment, ItemKey, Player, RunEvent, RunStatus, RunSummary, ShopOffer,
};

pub fn item_line(index: usize, item: &Equipment, equipped: bool) -> String {
    format!(
        "[{}] {}{} {} | power {}",
        index,
        if equipped { "* " } else { "" },
        item,
        item.describe(),
        item.power()
    )
}

pub fn inventory_lines(player: &Player) -> Vec<String> {
    player
        .inventory
        .iter()
        .enumerate()
        .map(|(i, (key, item))| item_line(i, item, player.loadout.is_equipped(key)))
        .collect()
}

pub fn loadout_lines(player: &Player) -> Vec<String> {
    let mut out = Vec::new();
    match player.loadout.armor(&player.inventory) {
        Some(a) => out.push(format!(
            "armor:   {} (HP {}, dodge {}%, cap {})",
            a.name,
            a.max_hp(),
            a.dodge_rate(),
            a.capacity()
        )),
        None => out.push("armor:   none".to_string()),
    }
    let weapons = player.loadout.weapons(&player.inventory);
    if weapons.is_empty() {
        out.push("weapons: none".to_string());
    }
    for (i, w) in weapons.iter().enumerate() {
        out.push(format!(
            "weapon {}: {} (ATK {}, CRIT {}%, WT {})",
            i,
            w.name,
            w.atk(),
            w.crit_rate(),
            w.weight()
        ));
    }
    let weight = player.loadout.total_weight(&player.inventory);
    let capacity = player.loadout.armor(&player.inventory).map_or(0, |a| a.capacity());
    out.push(format!(
        "load:    {}/{}{}",
        weight,
        capacity,
        if player.loadout.is_overweight(&player.inventory) { " (overweight: no dodge)" } else { "" }
    ));
    out
}

pub fn offer_line(index: usize, offer: &ShopOffer) -> String {
    format!("[{}] {} {} | {} EXP", index, offer.item, offer.item.describe(), offer.price)
}

pub fn status_line(status: &RunStatus) -> String {
    format!(
        "HP {}/{} | difficulty {} | EXP banked {} +{} -{} (available {})",
        status.hp,
        status.max_hp,
        status.difficulty,
        status.persistent_exp,
        status.exp_gained,
        status.exp_spent,
        status.available_exp
    )
}

pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let stats = &summary.stats;
    let mut out = vec![
        format!("outcome:           {:?}", summary.outcome),
        format!("enemies defeated:  {}", stats.enemies_defeated),
        format!("checkpoints:       {}", stats.checkpoints_reached),
        format!("final difficulty:  {}", summary.final_difficulty),
        format!("exp gained:        +{}", stats.exp_gained),
        format!("exp spent:         -{}", stats.exp_spent),
        format!("net gain:          {}", summary.net_gain),
        format!("banked exp:        {}", summary.persistent_exp),
    ];
    if stats.weapon_damage.is_empty() {
        out.push("weapon damage:     none".to_string());
    }
    for (name, tally) in &stats.weapon_damage {
        out.push(format!("  {}: {} damage over {} hits", name, tally.total_damage, tally.hits));
    }
    out
}

pub fn event_line(event: &RunEvent<'_>) -> Option<String> {
    Some(match event {
        RunEvent::Battle(r) => {
            let verdict = match r.outcome {
                BattleOutcome::Victory => {
                    format!("won in {} rounds, +{} EXP", r.rounds, r.exp_reward)
                }
                BattleOutcome::Defeat => format!("lost after {} rounds", r.rounds),
            };
            format!(
                "battle: {} (HP {}) - {}, took {} damage",
                r.monster.name, r.monster.hp, verdict, r.damage_taken
            )
        }
        RunEvent::Repaired { amount, hp, max_hp } => {
            format!("repair: +{} HP ({}/{})", amount, hp, max_hp)
        }
        RunEvent::RepairRejected(e) => format!("repair refused: {}", e),
        RunEvent::CheckpointReached { checkpoint, difficulty } => {
            format!("checkpoint {} reached; difficulty now {}", checkpoint, difficulty)
        }
        RunEvent::Applied(action) => format!("checkpoint action: {:?}", action),
        RunEvent::Rejected { action, error } => {
            format!("checkpoint action {:?} refused: {}", action, error)
        }
        RunEvent::Ended(_) => return None,
    })
}

/// Inventory index → key, for commands that take a menu position.
pub fn key_at(player: &Player, index: usize) -> anyhow::Result<ItemKey> {
    Ok(player.inventory.key_at(index)?)
}
