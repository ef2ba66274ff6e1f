#![warn(clippy::all, missing_docs)]

//! Rules engine for a railroad stock board game.
//!
//! A game cycles through a stock market phase and two business phases each round.
//! Players trade shares during the market phase; during the business phases the president
//! of every running company manages its equipment and track, then handles its earnings.
//! [`GameState`] owns one game and exposes each of those turns as a method that either
//! applies completely or reports every problem it found without changing anything.

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod registry;
pub mod turn;

pub use config::GameConfig;
pub use error::{ErrorKind, GameError, Rejected, RuleViolation, TurnResult};
pub use game::{
    CompanyEarnings, CompanyInventory, GameSnapshot, GameState, MarketAction, MarketTurn,
    SetupError,
};
pub use models::{Company, GlobalState, Phase, Player, TurnStage};
pub use registry::{GameHandle, GameRegistry, RegistryError};
pub use turn::{TieBreaker, TurnManager};
