use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::info;

use super::GameState;
use crate::board;
use crate::config::GameConfig;
use crate::models::{Company, GlobalState, Phase, Player};
use crate::turn::{TieBreaker, TurnManager};

/// Number of companies in every game.
pub const COMPANY_COUNT: usize = 10;

struct CompanySetup {
    name: &'static str,
    restricted: bool,
    track_budget: u32,
}

/// Companies in their fixed tie-break order; the last four open at tech level 3.
const COMPANIES: [CompanySetup; COMPANY_COUNT] = [
    CompanySetup {
        name: "New York, New Haven & Hartford",
        restricted: false,
        track_budget: 4,
    },
    CompanySetup {
        name: "Pennsylvania",
        restricted: false,
        track_budget: 16,
    },
    CompanySetup {
        name: "Boston & Maine",
        restricted: false,
        track_budget: 6,
    },
    CompanySetup {
        name: "Chesapeake & Ohio",
        restricted: false,
        track_budget: 22,
    },
    CompanySetup {
        name: "New York Central",
        restricted: false,
        track_budget: 20,
    },
    CompanySetup {
        name: "Baltimore & Ohio",
        restricted: false,
        track_budget: 18,
    },
    CompanySetup {
        name: "New York, Chicago & Saint Louis",
        restricted: true,
        track_budget: 10,
    },
    CompanySetup {
        name: "Illinois Central",
        restricted: true,
        track_budget: 12,
    },
    CompanySetup {
        name: "Erie",
        restricted: true,
        track_budget: 14,
    },
    CompanySetup {
        name: "Wabash",
        restricted: true,
        track_budget: 8,
    },
];

/// Reasons a game cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// No player names were given.
    #[error("a game needs at least one player")]
    NoPlayers,
    /// A player name was blank.
    #[error("player names cannot be empty")]
    EmptyName,
    /// A player name was given twice.
    #[error("player {0:?} listed more than once")]
    DuplicatePlayer(String),
}

impl GameState {
    /// Create a game for `player_names` and open the first market phase.
    pub fn new<S: AsRef<str>>(player_names: &[S], config: &GameConfig) -> Result<Self, SetupError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut game = Self::build(player_names, config, seed)?;
        info!(
            seed,
            players = player_names.len(),
            "created game; pass this seed to reproduce turn order"
        );
        game.begin_market_phase();
        Ok(game)
    }

    /// Create a game with the default configuration and a fixed tie-break seed.
    pub fn with_seed<S: AsRef<str>>(player_names: &[S], seed: u64) -> Result<Self, SetupError> {
        let config = GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        };
        Self::new(player_names, &config)
    }

    fn build<S: AsRef<str>>(
        player_names: &[S],
        config: &GameConfig,
        seed: u64,
    ) -> Result<Self, SetupError> {
        if player_names.is_empty() {
            return Err(SetupError::NoPlayers);
        }
        let mut seen = HashSet::new();
        for name in player_names.iter().map(AsRef::as_ref) {
            if name.trim().is_empty() {
                return Err(SetupError::EmptyName);
            }
            if !seen.insert(name) {
                return Err(SetupError::DuplicatePlayer(name.to_string()));
            }
        }

        let cash = config.starting_cash_for(player_names.len());
        let players = player_names
            .iter()
            .map(|name| (name.as_ref().to_string(), Player::new(name.as_ref(), cash)))
            .collect();

        let companies = COMPANIES
            .iter()
            .enumerate()
            .map(|(index, setup)| {
                let company = Company::new(
                    setup.name,
                    setup.restricted,
                    index as u32 + 1,
                    setup.track_budget,
                );
                (setup.name.to_string(), company)
            })
            .collect();

        Ok(Self {
            global: GlobalState {
                round: 0,
                phase: Phase::Market,
                trains_bought: 0,
                tech_level: board::tech_level(0),
                unmined_coal: board::starting_coal(),
                orphan_stocks: BTreeMap::new(),
            },
            turns: TurnManager::default(),
            players,
            companies,
            tie_breaker: TieBreaker::from_seed(seed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TurnStage, SHARES_PER_COMPANY};

    #[test]
    fn new_game_starts_in_market_round_one() -> anyhow::Result<()> {
        let game = GameState::with_seed(&["a", "b", "c", "d"], 1)?;
        assert_eq!(game.global().round, 1);
        assert_eq!(game.global().phase, Phase::Market);
        assert_eq!(game.global().tech_level, 1);
        assert_eq!(game.global().unmined_coal.len(), 5);
        assert_eq!(game.companies().len(), COMPANY_COUNT);
        for (name, company) in game.companies() {
            assert_eq!(name, &company.name);
            assert_eq!(company.held_stock, SHARES_PER_COMPANY);
            assert_eq!(company.stock_price, 0);
            assert!(company.built_track.is_empty());
            assert!(company.president.is_none());
            assert_eq!(company.turn_stage, TurnStage::Idle);
            assert!(board::starting_location(name).is_some());
        }
        assert_eq!(
            game.companies().values().filter(|c| c.restricted).count(),
            4
        );
        Ok(())
    }

    #[test]
    fn players_start_with_equal_cash() -> anyhow::Result<()> {
        let game = GameState::with_seed(&["a", "b", "c"], 1)?;
        assert_eq!(game.turns().order().len(), 3);
        for (name, player) in game.players() {
            assert_eq!(name, &player.name);
            assert_eq!(player.cash, 250);
            assert_eq!(player.net_worth, player.cash);
            assert!(player.stocks.is_empty());
        }
        let pair = GameState::with_seed(&["a", "b"], 1)?;
        assert!(pair.players().values().all(|player| player.cash == 10));
        Ok(())
    }

    #[test]
    fn rejects_bad_rosters() {
        let empty: [&str; 0] = [];
        assert_eq!(
            GameState::with_seed(&empty, 1).err(),
            Some(SetupError::NoPlayers)
        );
        assert_eq!(
            GameState::with_seed(&["a", "b", "a"], 1).err(),
            Some(SetupError::DuplicatePlayer("a".into()))
        );
        assert_eq!(
            GameState::with_seed(&["a", " "], 1).err(),
            Some(SetupError::EmptyName)
        );
    }
}
