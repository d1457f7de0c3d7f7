//! `battlesim`: runs battles from a content directory and prints the outcome.
mod config;

use std::path::Path;

use anyhow::{Context, Result};
use battle_content::{BattleContent, ConfigLoader, ContentFactory};
use battle_core::buff::{DEFAULT_RETRY_ATTEMPTS, retry};
use clap::Parser;
use runtime::{AiFactory, BattleManager, BattleSnapshot};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Args, CliConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_args(Args::parse());
    setup_logging(config.log_dir.as_deref())?;

    let content = load_content(&config)?;
    let ai = match config.strategy {
        Some(priority) => AiFactory::new()
            .with_character_priority(priority)
            .with_enemy_priority(priority),
        None => AiFactory::default(),
    };

    let mut snapshots = Vec::with_capacity(config.battles as usize);
    for index in 0..config.battles {
        let mut builder = BattleManager::from_content(&content).ai(ai);
        if let Some(seed) = config.seed_for(index) {
            builder = builder.seed(seed);
        }
        let mut manager = builder.build();

        let created = manager
            .create_battle(&content.roster)
            .context("Failed to create battle")?;
        let snapshot = manager
            .run_to_completion(&created.id, config.max_turns)
            .await
            .with_context(|| format!("Battle {} failed", created.id))?;
        tracing::info!(
            battle = %snapshot.id,
            winner = ?snapshot.winner,
            turns = snapshot.turn,
            "battle finished"
        );
        snapshots.push(snapshot);
    }

    if config.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        for (index, snapshot) in snapshots.iter().enumerate() {
            print_summary(index + 1, snapshot);
        }
    }
    Ok(())
}

/// Loads content, retrying transient filesystem failures, and applies the
/// optional rules override.
fn load_content(config: &CliConfig) -> Result<BattleContent> {
    let factory = ContentFactory::new(&config.data_dir);
    let mut content = retry(DEFAULT_RETRY_ATTEMPTS, |attempt| {
        tracing::debug!(attempt, dir = %factory.data_dir().display(), "loading content");
        factory.load_all()
    })
    .with_context(|| format!("Failed to load content from {}", config.data_dir.display()))?;

    if let Some(path) = &config.config_path {
        content.config = ConfigLoader::load(path)
            .with_context(|| format!("Failed to load battle rules from {}", path.display()))?;
    }
    Ok(content)
}

fn print_summary(index: usize, snapshot: &BattleSnapshot) {
    let outcome = match snapshot.winner {
        Some(side) => format!("{side} wins"),
        None if snapshot.active => "unfinished".to_string(),
        None => "no winner".to_string(),
    };
    println!(
        "#{index} {} seed={} rounds={} turns={} {outcome}",
        snapshot.id, snapshot.seed, snapshot.round, snapshot.turn
    );
    for participant in &snapshot.participants {
        println!(
            "  {:<6} {:<16} {:>5}/{:<5}",
            participant.side.to_string(),
            participant.name,
            participant.health(),
            participant.max_health()
        );
    }
    println!("  digest {}", snapshot.digest);
}

/// Logs to stderr, and also to `battlesim.log` when a directory is given.
fn setup_logging(log_dir: Option<&Path>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, "battlesim.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            // Leak the guard to keep file writer alive
            std::mem::forget(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking_file)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/battlesim.log", dir.display());
    }
    Ok(())
}
