//! Command-line and environment configuration for `battlesim`.
use std::env;
use std::path::PathBuf;

use clap::Parser;
use runtime::PriorityStrategy;

/// Data directory shipped with `battle-content`.
const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../battle/content/data");

#[derive(Debug, Parser)]
#[command(name = "battlesim", about = "Runs turn-based battles from a content directory")]
pub struct Args {
    /// Directory holding battle.toml, roster.toml, skills.ron and buffs.ron.
    #[arg(long, env = "BATTLE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Seed for the first battle; battle `n` uses `seed + n`.
    #[arg(long, env = "BATTLE_SEED")]
    pub seed: Option<u64>,

    /// Number of battles to run.
    #[arg(long, env = "BATTLE_COUNT", default_value_t = 1)]
    pub battles: u32,

    /// Stop each battle without a winner after this many turns.
    #[arg(long, env = "BATTLE_MAX_TURNS")]
    pub max_turns: Option<u32>,

    /// Also write logs to `battlesim.log` in this directory.
    #[arg(long, env = "BATTLE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Skill priority used by every AI (balanced, aggressive, defensive).
    #[arg(long)]
    pub strategy: Option<String>,

    /// Print final snapshots as JSON instead of a text summary.
    #[arg(long)]
    pub json: bool,
}

/// Resolved client settings.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    /// Optional TOML file overriding `battle.toml` from the data directory.
    pub config_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub battles: u32,
    pub max_turns: Option<u32>,
    pub log_dir: Option<PathBuf>,
    pub strategy: Option<PriorityStrategy>,
    pub json: bool,
}

impl CliConfig {
    /// Combines parsed flags with the remaining environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_CONFIG` - Path to a battle rules file
    /// - `BATTLE_STRATEGY` - Default AI priority when `--strategy` is absent
    pub fn from_args(args: Args) -> Self {
        let strategy = args
            .strategy
            .or_else(|| read_env::<String>("BATTLE_STRATEGY"))
            .map(|name| PriorityStrategy::from_name(&name));

        Self {
            data_dir: args.data_dir.unwrap_or_else(|| PathBuf::from(BUNDLED_DATA_DIR)),
            config_path: read_env::<PathBuf>("BATTLE_CONFIG"),
            seed: args.seed,
            battles: args.battles.max(1),
            max_turns: args.max_turns,
            log_dir: args.log_dir,
            strategy,
            json: args.json,
        }
    }

    /// Seed for the `index`-th battle, if seeding is requested.
    pub fn seed_for(&self, index: u32) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(u64::from(index)))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
