//! The game aggregate and its rule engines.
//!
//! [`GameState`] owns every record in a game. Each mutating operation validates the whole
//! request first and only then applies it, so a rejected request never changes anything.
//! The state is not internally synchronised; callers serialise writers per game (see
//! [`crate::registry`]).

mod earnings;
mod inventory;
mod market;
mod phase;
mod setup;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{GameError, Rejected};
use crate::models::{Company, GlobalState, Phase, Player, TurnStage};
use crate::turn::{TieBreaker, TurnManager};

pub use earnings::{CompanyEarnings, RECEIVERSHIP_PRICE};
pub use inventory::CompanyInventory;
pub use market::{MarketAction, MarketTurn};
pub use setup::{SetupError, COMPANY_COUNT};

/// Root aggregate of a single game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    global: GlobalState,
    turns: TurnManager,
    players: BTreeMap<String, Player>,
    companies: BTreeMap<String, Company>,
    tie_breaker: TieBreaker,
}

/// Owned copy of everything a client needs to render the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Board-wide state.
    pub global: GlobalState,
    /// Participants of the current phase in order.
    pub turn_order: Vec<String>,
    /// Participant whose turn it is.
    pub current_turn: Option<String>,
    /// Players by name.
    pub players: BTreeMap<String, Player>,
    /// Companies by name.
    pub companies: BTreeMap<String, Company>,
}

impl GameState {
    /// Board-wide state.
    pub fn global(&self) -> &GlobalState {
        &self.global
    }

    /// Turn order of the current phase.
    pub fn turns(&self) -> &TurnManager {
        &self.turns
    }

    /// Players by name.
    pub fn players(&self) -> &BTreeMap<String, Player> {
        &self.players
    }

    /// Companies by name.
    pub fn companies(&self) -> &BTreeMap<String, Company> {
        &self.companies
    }

    /// Look up a player.
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// Look up a company.
    pub fn company(&self, name: &str) -> Option<&Company> {
        self.companies.get(name)
    }

    /// Seed driving turn-order tie breaks.
    pub fn seed(&self) -> u64 {
        self.tie_breaker.seed()
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            global: self.global.clone(),
            turn_order: self.turns.order().to_vec(),
            current_turn: self.turns.current().map(str::to_owned),
            players: self.players.clone(),
            companies: self.companies.clone(),
        }
    }

    /// Recompute every player's net worth from current prices.
    fn revalue_players(&mut self) {
        let companies = &self.companies;
        for player in self.players.values_mut() {
            player.revalue(|name| {
                companies
                    .get(name)
                    .map(|company| company.stock_price)
                    .unwrap_or(0)
            });
        }
    }

    /// Company whose business turn it is, after checking that `player_name` may act for it
    /// at `stage`.
    fn acting_company(
        &self,
        player_name: &str,
        stage: TurnStage,
        refusal: &'static str,
    ) -> Result<&Company, Rejected> {
        let wrong_phase = || {
            Rejected::one(GameError::WrongPhase {
                expected: "a business phase",
                action: "perform business actions",
                actual: self.global.phase,
            })
        };
        if !self.global.phase.is_business() {
            return Err(wrong_phase());
        }
        let company = self
            .turns
            .current()
            .and_then(|name| self.companies.get(name))
            .ok_or_else(wrong_phase)?;

        if !self.players.contains_key(player_name) {
            return Err(Rejected::one(GameError::UnknownPlayer(
                player_name.to_string(),
            )));
        }
        if !company.is_president(player_name) {
            return Err(Rejected::one(GameError::NotPresident {
                company: company.name.clone(),
                president: company.president.clone(),
            }));
        }
        if company.turn_stage != stage {
            return Err(Rejected::one(GameError::WrongStage {
                company: company.name.clone(),
                reason: refusal,
            }));
        }
        Ok(company)
    }

    /// Shares of `company` not held by the company or any player.
    fn orphans(&self, company: &str) -> u32 {
        self.global.orphans(company)
    }

    fn is_market(&self) -> bool {
        self.global.phase == Phase::Market
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn snapshot_reflects_state() -> anyhow::Result<()> {
        let game = new_game();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.global.phase, Phase::Market);
        assert_eq!(snapshot.turn_order.len(), PLAYERS.len());
        assert_eq!(snapshot.current_turn.as_deref(), game.turns().current());
        let json = serde_json::to_value(&snapshot)?;
        assert_eq!(json["global"]["phase"], "Market");
        assert_eq!(json["companies"].as_object().map(|c| c.len()), Some(10));
        Ok(())
    }
}
