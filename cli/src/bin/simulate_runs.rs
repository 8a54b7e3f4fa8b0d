use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use steelsoul_cli::autopilot::{auto_equip, AutoPilot};
use steelsoul_cli::load_game_data;
use steelsoul_engine::{logging, AdventureRun, Dice, GameConfig, Player, RunOutcome, Shop};

#[derive(Parser)]
#[command(name = "simulate-runs")]
#[command(about = "Monte Carlo sim: many autopilot runs with a fresh starter kit")]
struct Args {
    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Autopilot returns to base after this many checkpoints
    #[arg(long, default_value_t = 3)]
    max_checkpoints: u32,

    /// Banked EXP each trial starts with
    #[arg(long, default_value_t = 0)]
    start_exp: i32,

    /// Repair when HP drops below this percentage
    #[arg(long, default_value_t = 60)]
    repair_below: i32,

    /// Offer a checkpoint shop during the run
    #[arg(long, default_value_t = false)]
    with_shop: bool,

    /// Optional config file (.json, .yaml or .yml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optional game data file (falls back to the bundled data)
    #[arg(long)]
    data: Option<PathBuf>,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Emit the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct Report {
    trials: u32,
    max_checkpoints: u32,
    returned_rate: f64,
    defeated_rate: f64,
    avg_enemies: f64,
    avg_net_gain: f64,
    avg_exp_spent: f64,
    median_checkpoints: u32,
    max_difficulty: u32,
}

fn median(sorted: &[u32]) -> u32 {
    if sorted.is_empty() {
        return 0;
    }
    let m = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[m]
    } else {
        (sorted[m - 1] + sorted[m]) / 2
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.data.is_some() {
        config.data_file = args.data.clone();
    }
    let data = load_game_data(&config)?;
    let settings = config.run_settings();

    let mut returned = 0u32;
    let mut enemies_total = 0u64;
    let mut net_total = 0i64;
    let mut spent_total = 0i64;
    let mut max_difficulty = 0u32;
    let mut checkpoints: Vec<u32> = Vec::with_capacity(args.trials as usize);

    for i in 0..args.trials {
        let trial_seed = args.seed.wrapping_add(i as u64);
        let mut dice = Dice::from_seed(trial_seed);
        let mut player = Player::with_starter_kit("sim", &data.catalog, &config.starter_kit);
        player.exp = args.start_exp;
        auto_equip(&mut player);

        let mut pilot = AutoPilot::new(args.max_checkpoints);
        pilot.repair_below_percent = args.repair_below;
        let mut shop = Shop::new();

        let mut run = AdventureRun::start(&mut player, &data.bestiary, &mut dice, settings)
            .with_context(|| format!("trial {} could not start", i))?;
        if args.with_shop {
            run = run.with_checkpoint_shop(&mut shop, &data.catalog);
        }
        let summary = run.drive(&mut pilot).with_context(|| format!("trial {} failed", i))?;

        if summary.outcome == RunOutcome::Returned {
            returned += 1;
        }
        enemies_total += u64::from(summary.stats.enemies_defeated);
        net_total += i64::from(summary.net_gain);
        spent_total += i64::from(summary.stats.exp_spent);
        max_difficulty = max_difficulty.max(summary.final_difficulty);
        checkpoints.push(summary.stats.checkpoints_reached);
    }

    checkpoints.sort_unstable();
    let trials_f = f64::from(args.trials.max(1));
    let report = Report {
        trials: args.trials,
        max_checkpoints: args.max_checkpoints,
        returned_rate: f64::from(returned) / trials_f,
        defeated_rate: f64::from(args.trials - returned) / trials_f,
        avg_enemies: enemies_total as f64 / trials_f,
        avg_net_gain: net_total as f64 / trials_f,
        avg_exp_spent: spent_total as f64 / trials_f,
        median_checkpoints: median(&checkpoints),
        max_difficulty,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("simulate-runs results");
    println!("---------------------");
    println!("trials:             {}", report.trials);
    println!("max checkpoints:    {}", report.max_checkpoints);
    println!("starter kit:        {:?}", config.starter_kit);
    println!("checkpoint shop:    {}", args.with_shop);
    println!();
    println!("returned rate:      {:.1}%", report.returned_rate * 100.0);
    println!("defeated rate:      {:.1}%", report.defeated_rate * 100.0);
    println!("avg enemies:        {:.2}", report.avg_enemies);
    println!("avg net gain:       {:.2}", report.avg_net_gain);
    println!("avg exp spent:      {:.2}", report.avg_exp_spent);
    println!("median checkpoints: {}", report.median_checkpoints);
    println!("max difficulty:     {}", report.max_difficulty);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::median;

    #[test]
    fn median_of_even_and_odd_lengths() {
        assert_eq!(median(&[]), 0);
        assert_eq!(median(&[4]), 4);
        assert_eq!(median(&[1, 2, 9]), 2);
        assert_eq!(median(&[1, 3, 5, 9]), 4);
    }
}
