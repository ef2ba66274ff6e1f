use std::{
    env,
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{bail, Context, Result};
use bo_core::{
    config::{self, GameConfig},
    CompanyEarnings, CompanyInventory, GameState, MarketTurn, TurnResult,
};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

/// A recorded game: who plays and every turn, in order.
#[derive(Debug, Deserialize)]
struct Script {
    players: Vec<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    steps: Vec<Step>,
}

/// One submitted turn. Without a `player` the step is played by whoever is due to act.
#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum Step {
    Market {
        #[serde(default)]
        player: Option<String>,
        #[serde(flatten)]
        turn: MarketTurn,
    },
    Inventory {
        #[serde(default)]
        player: Option<String>,
        #[serde(flatten)]
        update: CompanyInventory,
    },
    Earnings {
        #[serde(default)]
        player: Option<String>,
        #[serde(flatten)]
        earnings: CompanyEarnings,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Market { .. } => "market",
            Step::Inventory { .. } => "inventory",
            Step::Earnings { .. } => "earnings",
        }
    }

    fn player(&self) -> Option<&str> {
        match self {
            Step::Market { player, .. }
            | Step::Inventory { player, .. }
            | Step::Earnings { player, .. } => player.as_deref(),
        }
    }

    fn apply(&self, game: &mut GameState, player: &str) -> TurnResult {
        match self {
            Step::Market { turn, .. } => game.perform_market_turn(player, turn),
            Step::Inventory { update, .. } => game.update_company_inventory(player, update),
            Step::Earnings { earnings, .. } => game.handle_company_earnings(player, earnings),
        }
    }
}

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(script_path) = args.next().map(PathBuf::from) else {
        bail!("usage: bo-replay <script.json> [log-file]");
    };
    init_logging(args.next().map(PathBuf::from).as_deref())?;

    config::ensure_default_config()?;
    let mut config = GameConfig::load()?;
    let script = load_script(&script_path)?;
    if script.seed.is_some() {
        config.seed = script.seed;
    }

    let mut game = GameState::new(&script.players, &config)?;
    let mut rejected = 0;
    for (index, step) in script.steps.iter().enumerate() {
        let player = match step.player() {
            Some(player) => player.to_string(),
            None => due_player(&game),
        };
        match step.apply(&mut game, &player) {
            Ok(()) => info!(step = index + 1, kind = step.name(), %player, "applied"),
            Err(err) => {
                rejected += 1;
                warn!(step = index + 1, kind = step.name(), %player, "rejected: {err}");
            }
        }
    }
    info!(
        steps = script.steps.len(),
        rejected,
        round = game.global().round,
        phase = %game.global().phase,
        "replay finished"
    );

    let snapshot = serde_json::to_string_pretty(&game.snapshot())
        .context("failed to serialise final game state")?;
    println!("{snapshot}");
    Ok(())
}

fn load_script(path: &Path) -> Result<Script> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse script {}", path.display()))
}

/// Player due to act: the current player in the market, otherwise the acting company's
/// president.
fn due_player(game: &GameState) -> String {
    let current = game.turns().current().unwrap_or_default();
    if game.global().phase.is_business() {
        game.company(current)
            .and_then(|company| company.president.clone())
            .unwrap_or_default()
    } else {
        current.to_string()
    }
}

fn init_logging(log_path: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the final snapshot.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .compact()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
