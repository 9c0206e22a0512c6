use anyhow::{Context, Result};
use clap::Parser;
use snake_arcade::game::{GameConfig, GameEngine};
use snake_arcade::modes::HumanMode;
use snake_arcade::storage::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_arcade")]
#[command(version, about = "Snake with power-ups, in your terminal")]
struct Cli {
    /// JSON file overriding game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// File the high score is kept in
    #[arg(long, default_value = "snakeHighScore")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    no_save: bool,

    /// Seed for food and power-up placement
    #[arg(long)]
    seed: Option<u64>,

    /// Start with sound cues muted
    #[arg(long)]
    mute: bool,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Route tracing output to a file; the terminal belongs to the game
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file: {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    // Create game configuration from the optional config file
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    tracing::info!(?config, "Configuration loaded");

    let store: Box<dyn HighScoreStore> = if cli.no_save {
        Box::new(MemoryHighScoreStore::default())
    } else {
        Box::new(FileHighScoreStore::new(cli.high_score_file))
    };

    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, store, seed)?,
        None => GameEngine::new(config, store)?,
    };

    let mut human_mode = HumanMode::new(engine, cli.mute);
    human_mode.run().await?;

    Ok(())
}
