//! Game configuration loaded from defaults, an optional TOML file and `BO_` variables.

use std::{
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the user's config directory holding `config.toml`.
pub const CONFIG_DIR: &str = "bo";

const DEFAULT_CONFIG: &str = r#"# Board game engine settings.

# Seed for breaking exact ties in player turn order. Leave unset to draw a fresh seed
# (it is logged so the game can be reproduced).
# seed = 42

# Cash each player starts with when the player count is within the supported range.
starting_cash = 250

# Cash for player counts outside the supported range.
fallback_starting_cash = 10

min_players = 3
max_players = 6
"#;

/// Tunable game settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the turn-order tie breaker.
    pub seed: Option<u64>,
    /// Starting cash for supported player counts.
    pub starting_cash: i64,
    /// Starting cash for any other player count.
    pub fallback_starting_cash: i64,
    /// Smallest supported player count.
    pub min_players: usize,
    /// Largest supported player count.
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            starting_cash: 250,
            fallback_starting_cash: 10,
            min_players: 3,
            max_players: 6,
        }
    }
}

impl GameConfig {
    /// Load from the default location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (if it exists) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("BO"))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        settings
            .try_deserialize()
            .context("failed to parse game configuration")
    }

    /// Player counts that receive the regular starting cash.
    pub fn supported_players(&self) -> RangeInclusive<usize> {
        self.min_players..=self.max_players
    }

    /// Cash each player starts with in a game of `players` players.
    pub fn starting_cash_for(&self, players: usize) -> i64 {
        if self.supported_players().contains(&players) {
            self.starting_cash
        } else {
            self.fallback_starting_cash
        }
    }
}

/// Default configuration file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}
