//! Errors reported by game operations.
//!
//! Nothing here is fatal: every mutating operation collects all the problems it finds and
//! hands them back in a [`Rejected`], leaving the game untouched.

use std::fmt;

use thiserror::Error;

use crate::models::Phase;

/// Broad category of a [`GameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation is not allowed in the current phase.
    Phase,
    /// It is not the caller's turn, or the caller does not run the acting company.
    Turn,
    /// A player or company name is unknown.
    NotFound,
    /// A game rule would be broken.
    Validation,
}

/// A single reason an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Wrong phase for the operation.
    #[error("must be in {expected} to {action} (currently {actual})")]
    WrongPhase {
        /// Phase description the operation needs.
        expected: &'static str,
        /// What the caller tried to do.
        action: &'static str,
        /// Phase the game is in.
        actual: Phase,
    },
    /// Another player is up.
    #[error("it is currently {expected}'s turn")]
    NotYourTurn {
        /// Player whose turn it is.
        expected: String,
    },
    /// The caller does not preside over the acting company.
    #[error("it's {company}'s turn and {} is the president", .president.as_deref().unwrap_or("nobody"))]
    NotPresident {
        /// Company whose turn it is.
        company: String,
        /// Its president, if any.
        president: Option<String>,
    },
    /// The acting company is not at the requested step of its turn.
    #[error("{company} {reason}")]
    WrongStage {
        /// Company whose turn it is.
        company: String,
        /// Why the step cannot run.
        reason: &'static str,
    },
    /// No player by that name.
    #[error("no player with name {0:?}")]
    UnknownPlayer(String),
    /// No company by that name.
    #[error("no company with name {0:?}")]
    UnknownCompany(String),
    /// A game rule would be broken.
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

impl GameError {
    /// Category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::WrongPhase { .. } => ErrorKind::Phase,
            GameError::NotYourTurn { .. }
            | GameError::NotPresident { .. }
            | GameError::WrongStage { .. } => ErrorKind::Turn,
            GameError::UnknownPlayer(_) | GameError::UnknownCompany(_) => ErrorKind::NotFound,
            GameError::Rule(_) => ErrorKind::Validation,
        }
    }
}

/// Business rule violations.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("must specify company name to buy/sell stocks")]
    MissingCompany,
    #[error("cannot buy/sell 0 stocks in {company}")]
    ZeroShares { company: String },
    #[error("{company} shares cannot be bought/sold for ${offered} (price is ${price})")]
    PriceMismatch {
        company: String,
        offered: u32,
        price: u32,
    },
    #[error("{player} has no stock in {company}")]
    NoStock { player: String, company: String },
    #[error("{player} only has {held} shares in {company}")]
    NotEnoughShares {
        player: String,
        company: String,
        held: u32,
    },
    #[error("cannot sell the last player held stock in {company}")]
    LastPlayerStock { company: String },
    #[error("{company} locked until tech level 3")]
    Restricted { company: String },
    #[error("${price} not one of the valid starting prices for tech level {tech_level}")]
    InvalidStartingPrice { price: u32, tech_level: u32 },
    #[error("{player} has insufficient cash for {count} shares of {company} at ${price}")]
    InsufficientCash {
        player: String,
        company: String,
        count: u32,
        price: u32,
    },
    #[error("{company} only has {remaining} shares remaining")]
    SharesUnavailable { company: String, remaining: u32 },
    #[error("{company} only has {held} tech level {tech_level} equipment to scrap")]
    NotEnoughEquipment {
        company: String,
        held: u32,
        tech_level: u32,
    },
    #[error("invalid hex coordinate {0:?} to build track")]
    Unbuildable(String),
    #[error("{company} needs ${needed} but only has ${available}")]
    InsufficientTreasury {
        company: String,
        needed: i64,
        available: i64,
    },
    #[error("cannot build track and mine coal on the same turn")]
    TrackAndCoal,
    #[error("no coal located at {0:?} to be mined")]
    NoCoal(String),
    #[error("{company} has no track on {hex:?} to allow mining")]
    NoTrackForCoal { company: String, hex: String },
    #[error("{company} only has {remaining} unbuilt tracks remaining")]
    TrackBudget { company: String, remaining: u32 },
    #[error("cannot build more than {limit} track per turn")]
    BuildLimit { limit: u32 },
    #[error("{company} already has track built on {hex:?}")]
    AlreadyBuilt { company: String, hex: String },
    #[error("{hex:?} listed more than once")]
    DuplicateHex { hex: String },
    #[error("all built track must be connected")]
    Disconnected,
    #[error("{city} already has {railroads} railroads")]
    CityFull { city: String, railroads: usize },
    #[error("{company} can only service {capacity} cities")]
    ServiceCapacity { company: String, capacity: usize },
    #[error("not all map locations provided contain cities")]
    NotACity,
    #[error("{company} is not present in {city} to be able to service it")]
    NotPresent { company: String, city: String },
}

/// Every error found while validating an operation; the game was left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected(pub Vec<GameError>);

impl Rejected {
    /// Wrap a single error.
    pub fn one(error: impl Into<GameError>) -> Self {
        Self(vec![error.into()])
    }

    /// The collected errors.
    pub fn errors(&self) -> &[GameError] {
        &self.0
    }

    /// Whether any collected error matches `predicate`.
    pub fn contains(&self, predicate: impl Fn(&GameError) -> bool) -> bool {
        self.0.iter().any(predicate)
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Rejected {}

/// Outcome of a mutating game operation.
pub type TurnResult = Result<(), Rejected>;

pub(crate) fn finish(errors: Vec<GameError>) -> TurnResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Rejected(errors))
    }
}
