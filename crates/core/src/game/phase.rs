//! Phase transitions: Market → Business 1 → Business 2 → Market of the next round.

use std::cmp::Reverse;

use tracing::{debug, info};

use super::GameState;
use crate::board;
use crate::models::{Phase, TurnStage};
use crate::turn::TurnManager;

impl GameState {
    /// Open a new round's market phase. Players with the least cash go first, then those
    /// with the least net worth; exact ties fall to the seeded tie breaker.
    pub(super) fn begin_market_phase(&mut self) {
        self.global.round += 1;
        self.global.phase = Phase::Market;

        let mut order: Vec<String> = self.players.keys().cloned().collect();
        self.tie_breaker.shuffle(&mut order);
        let players = &self.players;
        order.sort_by_key(|name| {
            players
                .get(name)
                .map(|player| (player.cash, player.net_worth))
                .unwrap_or_default()
        });

        info!(round = self.global.round, ?order, "market phase begins");
        self.turns = TurnManager::new(order);
    }

    /// Advance to the next business phase. Companies with a president act in descending
    /// stock price order, earlier price changes first on ties.
    pub(super) fn begin_business_phase(&mut self) {
        self.global.phase = match self.global.phase {
            Phase::Market => Phase::Business1,
            Phase::Business1 | Phase::Business2 => Phase::Business2,
        };

        let mut operating: Vec<_> = self
            .companies
            .values()
            .filter(|company| company.president.is_some())
            .collect();
        operating.sort_by_key(|company| (Reverse(company.stock_price), company.price_changed));
        let order: Vec<String> = operating
            .into_iter()
            .map(|company| company.name.clone())
            .collect();

        for company in self.companies.values_mut() {
            company.turn_stage = TurnStage::Idle;
        }
        info!(
            round = self.global.round,
            phase = %self.global.phase,
            ?order,
            "business phase begins"
        );
        self.turns = TurnManager::new(order);

        match self.turns.current().map(str::to_owned) {
            Some(first) => self.set_stage(&first, TurnStage::Inventory),
            None => {
                info!(phase = %self.global.phase, "no company has a president, phase ends at once");
                self.finish_business_phase();
            }
        }
    }

    fn finish_business_phase(&mut self) {
        if self.global.phase == Phase::Business1 {
            self.begin_business_phase();
        } else {
            self.begin_market_phase();
        }
    }

    /// Close the current player's market turn. Once every player has passed in a row, any
    /// company with orphaned stock drops a step and the first business phase starts.
    pub(super) fn end_market_turn(&mut self, pass: bool) {
        let everyone_passed = if pass {
            self.turns.record_pass()
        } else {
            self.turns.reset_passes();
            false
        };
        self.turns.advance();

        if !everyone_passed {
            return;
        }
        for (name, orphans) in &self.global.orphan_stocks {
            if *orphans == 0 {
                continue;
            }
            if let Some(company) = self.companies.get_mut(name) {
                let dropped = board::prev_stock_price(company.stock_price);
                debug!(company = %name, from = company.stock_price, to = dropped, "orphaned stock lowers price");
                company.stock_price = dropped;
            }
        }
        self.revalue_players();
        self.begin_business_phase();
    }

    /// Close the acting company's business turn and hand over to the next company, or to
    /// the next phase once every company has acted.
    pub(super) fn end_business_turn(&mut self) {
        if let Some(current) = self.turns.current().map(str::to_owned) {
            self.set_stage(&current, TurnStage::Idle);
        }
        if self.turns.advance() {
            self.finish_business_phase();
        } else if let Some(next) = self.turns.current().map(str::to_owned) {
            self.set_stage(&next, TurnStage::Inventory);
        }
    }

    pub(super) fn set_stage(&mut self, company: &str, stage: TurnStage) {
        if let Some(company) = self.companies.get_mut(company) {
            company.turn_stage = stage;
        }
    }
}
