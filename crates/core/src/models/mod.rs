//! Shared game records.

mod company;
mod player;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use company::{Company, TurnStage, SHARES_PER_COMPANY};
pub use player::Player;

/// The three phases of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Players buy and sell stock.
    #[serde(rename = "Market")]
    Market,
    /// First round of company operations.
    #[serde(rename = "Business 1")]
    Business1,
    /// Second round of company operations.
    #[serde(rename = "Business 2")]
    Business2,
}

impl Phase {
    /// Whether companies are operating.
    pub fn is_business(self) -> bool {
        matches!(self, Phase::Business1 | Phase::Business2)
    }

    /// Position of the phase within a round.
    pub fn index(self) -> u32 {
        match self {
            Phase::Market => 0,
            Phase::Business1 => 1,
            Phase::Business2 => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Market => f.write_str("Market"),
            Phase::Business1 => f.write_str("Business 1"),
            Phase::Business2 => f.write_str("Business 2"),
        }
    }
}

/// Game time at which a stock price last changed.
///
/// Ordered by round, then phase, then turn; when two companies share a price the one
/// stamped earlier takes its business turn first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PriceStamp {
    /// Round number.
    pub round: u32,
    /// Phase index within the round.
    pub phase: u32,
    /// Turn cursor within the phase.
    pub turn: u32,
}

impl PriceStamp {
    /// Stamp for a moment in the game.
    pub fn new(round: u32, phase: Phase, turn: u32) -> Self {
        Self {
            round,
            phase: phase.index(),
            turn,
        }
    }
}

impl fmt::Display for PriceStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}-{:02}", self.round, self.phase, self.turn)
    }
}

/// Board-wide state shared by every player and company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Current round, starting at 1.
    pub round: u32,
    /// Current phase.
    pub phase: Phase,
    /// Trains bought across the whole game.
    pub trains_bought: u32,
    /// Tech level derived from `trains_bought`.
    pub tech_level: u32,
    /// Coal deposits that nobody has mined yet.
    pub unmined_coal: Vec<String>,
    /// Shares held by the bank without a seller of record, per company.
    pub orphan_stocks: BTreeMap<String, u32>,
}

impl GlobalState {
    /// Orphaned shares of `company`.
    pub fn orphans(&self, company: &str) -> u32 {
        self.orphan_stocks.get(company).copied().unwrap_or(0)
    }

    /// Stamp for the current moment, given the turn cursor.
    pub fn stamp(&self, turn: usize) -> PriceStamp {
        PriceStamp::new(self.round, self.phase, turn as u32)
    }
}
