use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use steelsoul_cli::autopilot::{auto_equip, AutoPilot};
use steelsoul_cli::{load_game_data, render};
use steelsoul_engine::{
    logging, AdventureRun, AdventureStats, Battle, Dice, GameConfig, GameData, Gear, Health, Player,
    SaveStore,
};
use tracing::info;

#[derive(Subcommand)]
enum Cmd {
    /// List every equipment template and monster in the game data
    Catalog,
    /// Create a fresh player holding the starter kit
    NewGame {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        #[arg(long)]
        name: String,
        /// Overwrite an occupied slot
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// List save slots
    Slots {
        /// Print slot summaries as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show banked EXP, inventory and loadout
    Show {
        #[arg(long, default_value_t = 1)]
        slot: u32,
    },
    /// Equip the inventory item at the given index (armor or weapon)
    Equip {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        #[arg(long)]
        item: usize,
    },
    /// Take off the weapon at a loadout position, or the armor (and with it every weapon)
    Unequip {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        #[arg(long, conflicts_with = "armor")]
        weapon: Option<usize>,
        #[arg(long, default_value_t = false)]
        armor: bool,
    },
    /// Level up an inventory item with banked EXP
    Upgrade {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        #[arg(long)]
        item: usize,
    },
    /// Throw away an unequipped inventory item
    Discard {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        #[arg(long)]
        item: usize,
    },
    /// Show the base shop; optionally reroll it or buy an offer
    Shop {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        /// Offer index to buy
        #[arg(long)]
        buy: Option<usize>,
        /// Pay the reroll fee for a fresh set of offers
        #[arg(long, default_value_t = false)]
        reroll: bool,
    },
    /// Practice fight against one random monster; nothing is saved
    Fight {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        #[arg(long, default_value_t = 0)]
        difficulty: u32,
    },
    /// Play an adventure run with the autopilot and bank the result
    Adventure {
        #[arg(long, default_value_t = 1)]
        slot: u32,
        /// Return to base after this many checkpoints
        #[arg(long, default_value_t = 3)]
        max_checkpoints: u32,
        /// EXP the autopilot keeps back from upgrades
        #[arg(long, default_value_t = 0)]
        reserve: i32,
        /// Print every battle transcript line
        #[arg(long, default_value_t = false)]
        transcripts: bool,
        /// Leave the save slot untouched
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
}

#[derive(Parser)]
#[command(name = "steelsoul")]
#[command(about = "Steel Soul command-line harness")]
struct Cli {
    /// Config file (.json, .yaml or .yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Game data file; overrides the config
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Save directory; overrides the config
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,
    /// RNG seed for determinism; overrides the config
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

struct Session {
    config: GameConfig,
    data: GameData,
    store: SaveStore,
    dice: Dice,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(data) = &cli.data {
            config.data_file = Some(data.clone());
        }
        if let Some(dir) = &cli.save_dir {
            config.save_dir = dir.clone();
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        let data = load_game_data(&config)?;
        let store = SaveStore::new(&config.save_dir, config.slot_count);
        let dice = match config.seed {
            Some(seed) => Dice::from_seed(seed),
            None => Dice::from_entropy(),
        };
        Ok(Self { config, data, store, dice })
    }

    fn load_player(&self, slot: u32) -> Result<Player> {
        match self.store.load_slot(slot, &self.data.catalog)? {
            Some(player) => Ok(player),
            None => bail!(
                "save slot {} is empty; run `steelsoul new-game --slot {} --name <NAME>` first",
                slot,
                slot
            ),
        }
    }
}

fn print_player(player: &Player) {
    println!("{} | banked EXP {}", player.name, player.exp);
    println!("inventory:");
    for line in render::inventory_lines(player) {
        println!("  {}", line);
    }
    for line in render::loadout_lines(player) {
        println!("{}", line);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let mut session = Session::open(&cli)?;

    match cli.cmd {
        Cmd::Catalog => {
            println!("equipment:");
            for item in session.data.catalog.iter() {
                println!("  {} {} {}", item.template_id(), item, item.describe());
            }
            println!("monsters:");
            for m in session.data.bestiary.monsters() {
                println!("  {} {} HP {} ATK {} EXP {}", m.id, m.name, m.hp, m.atk, m.exp);
            }
        }
        Cmd::NewGame { slot, name, force } => {
            session.store.initialize_slots()?;
            if !force && !session.store.is_slot_empty(slot)? {
                bail!("save slot {} is in use (pass --force to overwrite)", slot);
            }
            let name = name.trim();
            if name.is_empty() {
                bail!("player name must not be blank");
            }
            let mut player =
                Player::with_starter_kit(name, &session.data.catalog, &session.config.starter_kit);
            let weapons = auto_equip(&mut player);
            session.store.save_slot(slot, &player)?;
            // a stale shop file belongs to the previous player
            session.store.save_shops(slot, &Default::default())?;
            info!(slot, weapons, "new game created");
            println!(
                "created {} in slot {} with {} items",
                player.name,
                slot,
                player.inventory.len()
            );
        }
        Cmd::Slots { json } => {
            let summaries = session.store.slot_summaries();
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for s in summaries {
                    match s.player_name {
                        Some(name) => println!(
                            "slot {}: {} | EXP {} | {} items",
                            s.slot, name, s.exp, s.item_count
                        ),
                        None => println!("slot {}: empty", s.slot),
                    }
                }
            }
        }
        Cmd::Show { slot } => {
            let player = session.load_player(slot)?;
            print_player(&player);
        }
        Cmd::Equip { slot, item } => {
            let mut player = session.load_player(slot)?;
            let key = render::key_at(&player, item)?;
            let is_armor = player.inventory.armor(key).is_some();
            if is_armor {
                player.equip_armor(key)?;
            } else {
                player.equip_weapon(key)?;
            }
            session.store.save_slot(slot, &player)?;
            print_player(&player);
        }
        Cmd::Unequip { slot, weapon, armor } => {
            let mut player = session.load_player(slot)?;
            match (weapon, armor) {
                (Some(index), _) => {
                    player.unequip_weapon(index)?;
                }
                (None, true) => {
                    if player.unequip_armor().is_none() {
                        bail!("no armor is equipped");
                    }
                }
                (None, false) => bail!("pass --weapon <POSITION> or --armor"),
            }
            session.store.save_slot(slot, &player)?;
            print_player(&player);
        }
        Cmd::Upgrade { slot, item } => {
            let mut player = session.load_player(slot)?;
            let key = render::key_at(&player, item)?;
            let receipt = player.upgrade(key)?;
            session.store.save_slot(slot, &player)?;
            println!(
                "{} is now level {} (-{} EXP, {} left)",
                receipt.name, receipt.new_level, receipt.cost, player.exp
            );
        }
        Cmd::Discard { slot, item } => {
            let mut player = session.load_player(slot)?;
            let key = render::key_at(&player, item)?;
            let dropped = player.discard(key)?;
            session.store.save_slot(slot, &player)?;
            println!("discarded {}", dropped);
        }
        Cmd::Shop { slot, buy, reroll } => {
            let mut player = session.load_player(slot)?;
            let mut shops = session.store.load_shops(slot, &session.data.catalog)?;
            let catalog = &session.data.catalog;
            shops.base.refresh_if_needed(catalog, &mut session.dice);
            if reroll {
                let fee = shops.base.reroll(catalog, &mut session.dice, &mut player.exp)?;
                println!("rerolled for {} EXP", fee);
            }
            if let Some(index) = buy {
                let key = shops.base.purchase(index, &mut player.exp, &mut player.inventory)?;
                let bought = player.inventory.get(key).map(|i| i.to_string()).unwrap_or_default();
                println!("bought {}", bought);
            }
            session.store.save_slot(slot, &player)?;
            session.store.save_shops(slot, &shops)?;
            println!("banked EXP {} | reroll fee {}", player.exp, shops.base.reroll_fee());
            for (i, offer) in shops.base.offers().iter().enumerate() {
                println!("{}", render::offer_line(i, offer));
            }
        }
        Cmd::Fight { slot, difficulty } => {
            let player = session.load_player(slot)?;
            let gear = Gear::from_loadout(&player.loadout, &player.inventory);
            let mut health = Health::new(player.max_hp(session.config.default_max_hp));
            let mut stats = AdventureStats::new();
            let battle = Battle::engage(&session.data.bestiary, difficulty, &mut session.dice)?;
            let report = battle.run(&gear, &mut health, &mut stats, &mut session.dice);
            for line in &report.log {
                println!("{}", line);
            }
            println!(
                "{:?} after {} rounds | HP {}/{} | EXP that would be earned: {}",
                report.outcome, report.rounds, health.hp, health.max_hp, report.exp_reward
            );
        }
        Cmd::Adventure { slot, max_checkpoints, reserve, transcripts, no_save } => {
            let mut player = session.load_player(slot)?;
            let mut shops = session.store.load_shops(slot, &session.data.catalog)?;
            let settings = session.config.run_settings();
            let mut pilot = AutoPilot::new(max_checkpoints);
            pilot.reserve = reserve;
            pilot.verbose = true;
            pilot.transcripts = transcripts;

            let summary = {
                let data = &session.data;
                let mut run =
                    AdventureRun::start(&mut player, &data.bestiary, &mut session.dice, settings)?
                        .with_checkpoint_shop(&mut shops.checkpoint, &data.catalog);
                println!("{}", render::status_line(&run.status()));
                run.drive(&mut pilot)?
            };
            for line in render::summary_lines(&summary) {
                println!("{}", line);
            }

            if no_save {
                println!("(not saved)");
            } else {
                shops.base.mark_needs_refresh();
                session.store.save_slot(slot, &player).context("failed to bank the run")?;
                session.store.save_shops(slot, &shops)?;
            }
        }
    }
    Ok(())
}
