//! Headless runner: plays a game with a fixed build order and prints a
//! summary. Useful for balance checks and for reproducing a seed.
//!
//! ```text
//! outpost-headless [--ticks N] [--seed N] [--config PATH] [--verbose] [--events]
//! ```
//!
//! Log output is controlled with `RUST_LOG`, e.g. `RUST_LOG=outpost_core=debug`.
//! Without it, `--verbose` turns on debug logs for the core.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use outpost_core::entity::{Turret, Worker};
use outpost_core::{GameEvent, SimConfig, Simulation};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ten minutes of game time at the default tick.
const DEFAULT_TICKS: u64 = 37_500;

/// Ticks between autopilot decisions.
const DECISION_TICKS: u64 = 30;

const MAX_WORKERS: usize = 10;
const MAX_TURRETS: usize = 6;
const MAX_BATTERIES: usize = 2;

/// Plays a headless game of Outpost and prints a summary.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticks to simulate before stopping.
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_TICKS)]
    ticks: u64,
    /// Seed for all game randomness.
    #[arg(long, value_name = "SEED", default_value_t = 0)]
    seed: u64,
    /// JSON file overriding the default config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Enable debug logs for the core when `RUST_LOG` is unset.
    #[arg(short, long)]
    verbose: bool,
    /// Print every game event as a JSON line.
    #[arg(long = "events")]
    print_events: bool,
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SimConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "outpost_core=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let subscriber = tracing_subscriber::fmt()
        .without_time()
        .with_env_filter(filter)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("logging already initialised");
    }
}

// =============================================================================
// Autopilot
// =============================================================================

/// Slots for defenses, offset from the base towards the enemy entry edges.
fn defense_slot(base: Vec2, index: usize) -> Vec2 {
    #[allow(clippy::cast_precision_loss)]
    let column = index as f32 - 2.5;
    base + Vec2::new(column * 110.0, -220.0)
}

/// Makes at most one purchase, in priority order.
fn autopilot(sim: &mut Simulation) {
    let arena = sim.arena();
    let base = arena.base().body.position;
    let workers = arena.count::<Worker>();
    let turrets = arena.count::<Turret>();
    let batteries = arena.batteries().len();
    let launchers = arena.launchers().len();
    let weakest = arena
        .turrets()
        .values()
        .min_by_key(|t| t.armament.level)
        .map(|t| t.id);

    let result = if workers < 3 || (workers < MAX_WORKERS && turrets >= workers / 3) {
        sim.build_worker(None).map(drop)
    } else if turrets < MAX_TURRETS {
        sim.build_turret(defense_slot(base, turrets)).map(drop)
    } else if batteries < MAX_BATTERIES {
        #[allow(clippy::cast_precision_loss)]
        let offset = Vec2::new(-150.0 + 300.0 * batteries as f32, -120.0);
        sim.build_battery(base + offset).map(drop)
    } else if launchers == 0 {
        sim.build_missile_launcher(base + Vec2::new(0.0, -320.0)).map(drop)
    } else if let Some(turret) = weakest {
        sim.upgrade_turret(turret).map(drop)
    } else {
        Ok(())
    };

    if let Err(err) = result {
        tracing::trace!(error = %err, "autopilot purchase skipped");
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = load_config(args.config.as_deref())?;
    let mut sim = Simulation::new(config, args.seed).context("invalid simulation config")?;
    info!(seed = args.seed, ticks = args.ticks, "starting headless run");

    let mut collected_events = 0usize;
    for tick in 0..args.ticks {
        if tick % DECISION_TICKS == 0 {
            autopilot(&mut sim);
        }
        sim.step();

        for event in sim.take_events() {
            collected_events += 1;
            if args.print_events {
                println!("{}", serde_json::to_string(&event)?);
            }
            match event {
                GameEvent::PhaseCompleted { phase, bonus } => {
                    info!(%phase, bonus, tick = sim.tick(), "phase completed");
                }
                GameEvent::GameOver => warn!(tick = sim.tick(), "base destroyed"),
                _ => {}
            }
        }
        if sim.is_over() {
            break;
        }
    }

    let outcome = if sim.is_victory() {
        "victory"
    } else if sim.is_over() {
        "defeat"
    } else {
        "running"
    };
    let world = sim.world();
    println!("outcome:    {outcome}");
    println!("ticks:      {}", sim.tick());
    #[allow(clippy::cast_precision_loss)]
    let seconds = sim.now() as f64 / 1000.0;
    println!("time:       {seconds:.1}s");
    println!("wave:       {}", sim.wave());
    println!("phase:      {}", sim.phase());
    println!("minerals:   {:.0}", sim.economy().minerals());
    println!("harvested:  {:.0}", sim.economy().total_collected());
    println!("base hp:    {:.0}", world.arena.base().health.hp());
    println!("workers:    {}", world.arena.count::<Worker>());
    println!("turrets:    {}", world.arena.count::<Turret>());
    println!("enemies:    {}", world.arena.enemies().len());
    println!("events:     {collected_events}");
    Ok(())
}

#[cfg(test)]
mod args_tests {
    use super::*;

    #[test]
    fn defaults_run_ten_minutes_unseeded() {
        let args = Args::try_parse_from(["outpost-headless"]).unwrap();
        assert_eq!(args.ticks, DEFAULT_TICKS);
        assert_eq!(args.seed, 0);
        assert!(args.config.is_none());
        assert!(!args.verbose);
        assert!(!args.print_events);
    }

    #[test]
    fn all_flags_parse() {
        let args = Args::try_parse_from([
            "outpost-headless",
            "--ticks",
            "3000",
            "--seed",
            "3",
            "--config",
            "game.json",
            "-v",
            "--events",
        ])
        .unwrap();
        assert_eq!(args.ticks, 3000);
        assert_eq!(args.seed, 3);
        assert_eq!(args.config.as_deref(), Some(Path::new("game.json")));
        assert!(args.verbose);
        assert!(args.print_events);
    }

    #[test]
    fn bad_values_and_unknown_flags_are_rejected() {
        assert!(Args::try_parse_from(["outpost-headless", "--ticks", "many"]).is_err());
        assert!(Args::try_parse_from(["outpost-headless", "--seed"]).is_err());
        assert!(Args::try_parse_from(["outpost-headless", "--turbo"]).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/outpost.json"))).is_err());
        assert!(load_config(None).is_ok());
    }
}
