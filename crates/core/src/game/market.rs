//! Stock market turns: any number of sales followed by at most one purchase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::GameState;
use crate::board;
use crate::error::{finish, GameError, Rejected, RuleViolation, TurnResult};
use crate::models::{Company, Player, SHARES_PER_COMPANY};

/// A single buy or sell order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketAction {
    /// Company whose shares change hands.
    pub company: String,
    /// Number of shares.
    pub count: u32,
    /// Price per share. Required when starting a company, optional otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
}

impl MarketAction {
    /// Order for `count` shares of `company` at the current price.
    pub fn new(company: impl Into<String>, count: u32) -> Self {
        Self {
            company: company.into(),
            count,
            price: None,
        }
    }

    /// Same order with an explicit price.
    pub fn at(mut self, price: u32) -> Self {
        self.price = Some(price);
        self
    }
}

/// Everything a player does on one market turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketTurn {
    /// Sales, applied first.
    #[serde(default)]
    pub sales: Vec<MarketAction>,
    /// Optional purchase, applied after the sales.
    #[serde(default)]
    pub purchase: Option<MarketAction>,
}

impl MarketTurn {
    /// A turn where the player does nothing.
    pub fn pass() -> Self {
        Self::default()
    }

    /// Whether the turn contains no action at all.
    pub fn is_pass(&self) -> bool {
        self.sales.is_empty() && self.purchase.is_none()
    }
}

/// A validated order with its price resolved.
#[derive(Debug)]
struct Trade {
    company: String,
    count: u32,
    price: u32,
}

impl Trade {
    fn value(&self) -> i64 {
        i64::from(self.count) * i64::from(self.price)
    }
}

impl GameState {
    /// Validate and apply `player_name`'s market turn.
    ///
    /// Every order is checked before anything changes; if any check fails the complete
    /// list of problems is returned and the game is untouched.
    pub fn perform_market_turn(&mut self, player_name: &str, turn: &MarketTurn) -> TurnResult {
        let (sales, purchase) = self.validate_market_turn(player_name, turn)?;

        for sale in sales {
            self.sell_stock(player_name, sale);
        }
        if let Some(purchase) = purchase {
            self.buy_stock(player_name, purchase);
        }
        if !turn.is_pass() {
            self.revalue_players();
        }
        self.end_market_turn(turn.is_pass());
        Ok(())
    }

    fn validate_market_turn(
        &self,
        player_name: &str,
        turn: &MarketTurn,
    ) -> Result<(Vec<Trade>, Option<Trade>), Rejected> {
        if !self.is_market() {
            return Err(Rejected::one(GameError::WrongPhase {
                expected: "the market phase",
                action: "perform market actions",
                actual: self.global.phase,
            }));
        }
        let player = self
            .players
            .get(player_name)
            .ok_or_else(|| Rejected::one(GameError::UnknownPlayer(player_name.to_string())))?;
        match self.turns.current() {
            Some(expected) if expected == player_name => {}
            expected => {
                return Err(Rejected::one(GameError::NotYourTurn {
                    expected: expected.unwrap_or_default().to_string(),
                }))
            }
        }

        let mut errors = Vec::new();
        let mut sold: BTreeMap<&str, u32> = BTreeMap::new();
        let mut sale_cash = 0;
        let mut sales = Vec::with_capacity(turn.sales.len());
        for action in &turn.sales {
            match self.validate_sale(player, action, &mut sold) {
                Ok(trade) => {
                    sale_cash += trade.value();
                    sales.push(trade);
                }
                Err(err) => errors.push(err),
            }
        }

        let purchase = match &turn.purchase {
            Some(action) => match self.validate_buy(player, action, sale_cash) {
                Ok(trade) => Some(trade),
                Err(err) => {
                    errors.push(err);
                    None
                }
            },
            None => None,
        };

        finish(errors)?;
        Ok((sales, purchase))
    }

    /// Checks shared by sales and purchases; resolves the price from state when the company
    /// is already trading.
    fn validate_action(&self, action: &MarketAction) -> Result<(&Company, u32), GameError> {
        if action.company.is_empty() {
            return Err(RuleViolation::MissingCompany.into());
        }
        let company = self
            .companies
            .get(&action.company)
            .ok_or_else(|| GameError::UnknownCompany(action.company.clone()))?;
        if action.count == 0 {
            return Err(RuleViolation::ZeroShares {
                company: company.name.clone(),
            }
            .into());
        }
        // A zero price is the same as leaving it out.
        let price = action.price.filter(|price| *price != 0);
        if !company.is_started() {
            return Ok((company, price.unwrap_or(0)));
        }
        match price {
            Some(offered) if offered != company.stock_price => Err(RuleViolation::PriceMismatch {
                company: company.name.clone(),
                offered,
                price: company.stock_price,
            }
            .into()),
            _ => Ok((company, company.stock_price)),
        }
    }

    fn validate_sale<'a>(
        &self,
        player: &Player,
        action: &'a MarketAction,
        sold: &mut BTreeMap<&'a str, u32>,
    ) -> Result<Trade, GameError> {
        let (company, price) = self.validate_action(action)?;
        let already_sold = sold.get(action.company.as_str()).copied().unwrap_or(0);
        let held = player.shares(&company.name).saturating_sub(already_sold);

        if held == 0 {
            return Err(RuleViolation::NoStock {
                player: player.name.clone(),
                company: company.name.clone(),
            }
            .into());
        }
        if action.count > held {
            return Err(RuleViolation::NotEnoughShares {
                player: player.name.clone(),
                company: company.name.clone(),
                held,
            }
            .into());
        }
        // Selling out entirely is only allowed while some other player still holds stock.
        if action.count == held {
            let outside_players = company.held_stock + self.orphans(&company.name) + already_sold;
            if outside_players + action.count == SHARES_PER_COMPANY {
                return Err(RuleViolation::LastPlayerStock {
                    company: company.name.clone(),
                }
                .into());
            }
        }

        *sold.entry(action.company.as_str()).or_default() += action.count;
        Ok(Trade {
            company: company.name.clone(),
            count: action.count,
            price,
        })
    }

    /// `sale_cash` is what this turn's validated sales will pay out; it is available for
    /// the purchase.
    fn validate_buy(
        &self,
        player: &Player,
        action: &MarketAction,
        sale_cash: i64,
    ) -> Result<Trade, GameError> {
        let (company, price) = self.validate_action(action)?;
        let tech_level = self.global.tech_level;

        if !company.is_started() {
            if company.restricted && tech_level < 3 {
                return Err(RuleViolation::Restricted {
                    company: company.name.clone(),
                }
                .into());
            }
            if !board::starting_stock_prices(tech_level).contains(&price) {
                return Err(RuleViolation::InvalidStartingPrice { price, tech_level }.into());
            }
        }

        let cost = i64::from(action.count) * i64::from(price);
        if cost > player.cash + sale_cash {
            return Err(RuleViolation::InsufficientCash {
                player: player.name.clone(),
                company: company.name.clone(),
                count: action.count,
                price,
            }
            .into());
        }
        let remaining = company.held_stock + self.orphans(&company.name);
        if action.count > remaining {
            return Err(RuleViolation::SharesUnavailable {
                company: company.name.clone(),
                remaining,
            }
            .into());
        }

        Ok(Trade {
            company: company.name.clone(),
            count: action.count,
            price,
        })
    }

    /// Exchange cash for shares. Orphaned shares are sold before the company's own, and
    /// the buyer takes the presidency once they strictly out-hold the incumbent.
    fn buy_stock(&mut self, player_name: &str, trade: Trade) {
        let stamp = self.global.stamp(self.turns.cursor());
        let orphans = self.orphans(&trade.company);
        let from_orphans = trade.count.min(orphans);
        if from_orphans == orphans {
            self.global.orphan_stocks.remove(&trade.company);
        } else {
            self.global
                .orphan_stocks
                .insert(trade.company.clone(), orphans - from_orphans);
        }

        let Some(player) = self.players.get_mut(player_name) else {
            return;
        };
        player.cash -= trade.value();
        player.add_shares(&trade.company, trade.count);
        let buyer_shares = player.shares(&trade.company);

        let incumbent_shares = self
            .companies
            .get(&trade.company)
            .and_then(|company| company.president.as_deref())
            .and_then(|president| self.players.get(president))
            .map(|president| president.shares(&trade.company));

        let Some(company) = self.companies.get_mut(&trade.company) else {
            return;
        };
        if !company.is_started() {
            company.stock_price = trade.price;
            company.price_changed = stamp;
            company.built_track = board::starting_location(&company.name)
                .map(|hex| vec![hex.to_string()])
                .unwrap_or_default();
            info!(company = %company.name, price = trade.price, president = player_name, "company started");
        }
        company.held_stock -= trade.count - from_orphans;
        company.treasury += trade.value();
        if incumbent_shares.map_or(true, |held| held < buyer_shares) {
            company.president = Some(player_name.to_string());
        }
        debug!(player = player_name, company = %trade.company, count = trade.count, price = trade.price, "bought stock");
    }

    /// Exchange shares for cash from the bank. The shares become orphaned, and a selling
    /// president hands over to whoever now holds strictly more.
    fn sell_stock(&mut self, player_name: &str, trade: Trade) {
        *self
            .global
            .orphan_stocks
            .entry(trade.company.clone())
            .or_default() += trade.count;

        let Some(player) = self.players.get_mut(player_name) else {
            return;
        };
        player.cash += trade.value();
        player.remove_shares(&trade.company, trade.count);
        debug!(player = player_name, company = %trade.company, count = trade.count, price = trade.price, "sold stock");

        let seller_was_president = self
            .companies
            .get(&trade.company)
            .is_some_and(|company| company.is_president(player_name));
        if seller_was_president {
            let president = self.largest_holder(&trade.company, player_name);
            if let Some(company) = self.companies.get_mut(&trade.company) {
                company.president = president;
            }
        }
    }

    /// Player with the most shares in `company`, keeping `incumbent` on ties, or `None`
    /// when no player holds any.
    pub(super) fn largest_holder(&self, company: &str, incumbent: &str) -> Option<String> {
        let mut best = (
            incumbent,
            self.players
                .get(incumbent)
                .map(|player| player.shares(company))
                .unwrap_or(0),
        );
        for (name, player) in &self.players {
            let held = player.shares(company);
            if held > best.1 {
                best = (name.as_str(), held);
            }
        }
        (best.1 > 0).then(|| best.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Phase;

    const PENN: &str = "Pennsylvania";
    const ERIE: &str = "Erie";

    fn buy(company: &str, count: u32, price: Option<u32>) -> MarketTurn {
        MarketTurn {
            sales: Vec::new(),
            purchase: Some(MarketAction {
                company: company.to_string(),
                count,
                price,
            }),
        }
    }

    fn sell(company: &str, count: u32) -> MarketTurn {
        MarketTurn {
            sales: vec![MarketAction::new(company, count)],
            purchase: None,
        }
    }

    /// Apply a turn that must fail and check nothing changed.
    fn rejected(game: &mut GameState, player: &str, turn: &MarketTurn) -> Rejected {
        let before = game.clone();
        let err = game
            .perform_market_turn(player, turn)
            .expect_err("turn should be rejected");
        assert_eq!(*game, before, "rejected turn changed the game");
        err
    }

    #[test]
    fn starting_a_company_sets_price_president_and_track() {
        let mut game = new_game();
        let first = game.current_name();
        game.perform_market_turn(&first, &buy(PENN, 3, Some(60)))
            .expect("legal start");

        let company = game.company(PENN).expect("company");
        assert_eq!(company.stock_price, 60);
        assert_eq!(company.held_stock, 7);
        assert_eq!(company.treasury, 180);
        assert_eq!(company.president.as_deref(), Some(first.as_str()));
        assert_eq!(company.built_track, vec!["G24"]);
        assert_eq!(company.price_changed, game.global().stamp(0));
        let player = game.player(&first).expect("player");
        assert_eq!(player.cash, 250 - 180);
        assert_eq!(player.shares(PENN), 3);
        assert_eq!(player.net_worth, 250);
        assert_ne!(game.current_name(), first);
        game.assert_share_conservation();
    }

    #[test]
    fn start_price_must_be_in_window() {
        let mut game = new_game();
        let first = game.current_name();
        for price in [None, Some(50), Some(74), Some(61)] {
            let err = rejected(&mut game, &first, &buy(PENN, 1, price));
            assert!(err.contains(|e| matches!(
                e,
                GameError::Rule(RuleViolation::InvalidStartingPrice { .. })
            )));
        }
    }

    #[test]
    fn restricted_company_waits_for_tech_three() {
        let mut game = new_game();
        let first = game.current_name();
        game.global_mut().tech_level = 2;
        for price in board::STOCK_PRICES {
            let err = rejected(&mut game, &first, &buy(ERIE, 1, Some(price)));
            assert!(err.contains(|e| matches!(e, GameError::Rule(RuleViolation::Restricted { .. }))));
        }

        game.global_mut().tech_level = 3;
        let price = board::starting_stock_prices(3)[1];
        game.perform_market_turn(&first, &buy(ERIE, 2, Some(price)))
            .expect("tech level 3 opens restricted companies");
        let erie = game.company(ERIE).expect("company");
        assert_eq!(erie.stock_price, price);
        assert_eq!(erie.held_stock, 8);
        assert_eq!(erie.president.as_deref(), Some(first.as_str()));
        assert_eq!(erie.built_track, vec!["D19"]);
    }

    #[test]
    fn precondition_failures() {
        let mut game = new_game();
        let first = game.current_name();
        let second = game.turns().order()[1].clone();

        let err = rejected(&mut game, "zed", &MarketTurn::pass());
        assert_eq!(err.errors()[0].kind(), ErrorKind::NotFound);
        let err = rejected(&mut game, &second, &MarketTurn::pass());
        assert_eq!(
            err.errors(),
            [GameError::NotYourTurn {
                expected: first.clone()
            }]
        );

        game.grant("a", PENN, 2, 60);
        game.pass_market();
        let err = rejected(&mut game, "a", &MarketTurn::pass());
        assert_eq!(err.errors()[0].kind(), ErrorKind::Phase);
    }

    #[test]
    fn collects_every_invalid_order() {
        let mut game = new_game();
        let first = game.current_name();
        game.grant(&first, PENN, 2, 60);
        let turn = MarketTurn {
            sales: vec![
                MarketAction::new("", 1),
                MarketAction::new("Reading", 1),
                MarketAction::new(PENN, 0),
                MarketAction::new(PENN, 1).at(66),
                MarketAction::new(ERIE, 1),
            ],
            purchase: Some(MarketAction::new(PENN, 9)),
        };
        let err = rejected(&mut game, &first, &turn);
        assert_eq!(err.errors().len(), 6);
        assert_eq!(err.errors()[1].kind(), ErrorKind::NotFound);
        assert!(err
            .errors()
            .iter()
            .filter(|e| *e != &GameError::UnknownCompany("Reading".into()))
            .all(|e| e.kind() == ErrorKind::Validation));
    }

    #[test]
    fn purchase_may_spend_sale_proceeds() {
        let mut game = new_game();
        let first = game.current_name();
        let other = game.turns().order()[1].clone();
        game.grant(&first, PENN, 3, 100);
        game.grant(&other, PENN, 3, 100);
        game.player_mut(&first).cash = 0;

        let turn = MarketTurn {
            sales: vec![MarketAction::new(PENN, 2)],
            purchase: Some(MarketAction::new(PENN, 1)),
        };
        game.perform_market_turn(&first, &turn)
            .expect("sale proceeds cover the purchase");
        let player = game.player(&first).expect("player");
        assert_eq!(player.cash, 100);
        assert_eq!(player.shares(PENN), 2);
        // The orphaned share is bought back before company stock; its price still
        // reaches the treasury.
        assert_eq!(game.global().orphans(PENN), 1);
        let company = game.company(PENN).expect("company");
        assert_eq!(company.held_stock, 4);
        assert_eq!(company.treasury, 100);
        game.assert_share_conservation();
    }

    #[test]
    fn zero_price_means_current_price() {
        let mut game = new_game();
        let first = game.current_name();
        game.grant("b", PENN, 3, 60);
        game.perform_market_turn(&first, &buy(PENN, 1, Some(0)))
            .expect("zero price is filled in");
        assert_eq!(game.player(&first).map(|p| p.cash), Some(250 - 60));
        assert_eq!(game.company(PENN).map(|c| c.stock_price), Some(60));

        let next = game.current_name();
        let err = rejected(&mut game, &next, &buy("Boston & Maine", 1, Some(0)));
        assert!(err.contains(|e| matches!(
            e,
            GameError::Rule(RuleViolation::InvalidStartingPrice { price: 0, .. })
        )));
    }

    #[test]
    fn insufficient_cash_and_shares() {
        let mut game = new_game();
        let first = game.current_name();
        game.company_mut(PENN).stock_price = 60;

        let err = rejected(&mut game, &first, &buy(PENN, 5, None));
        assert!(err.contains(|e| matches!(
            e,
            GameError::Rule(RuleViolation::InsufficientCash { .. })
        )));
        game.player_mut(&first).cash = 10_000;
        let err = rejected(&mut game, &first, &buy(PENN, 11, None));
        assert!(err.contains(|e| matches!(
            e,
            GameError::Rule(RuleViolation::SharesUnavailable { remaining: 10, .. })
        )));
    }

    #[test]
    fn cannot_sell_last_player_stock() {
        let mut game = new_game();
        let first = game.current_name();
        game.grant(&first, PENN, 3, 60);

        let err = rejected(&mut game, &first, &sell(PENN, 3));
        assert!(err.contains(|e| matches!(
            e,
            GameError::Rule(RuleViolation::LastPlayerStock { .. })
        )));
        let split = MarketTurn {
            sales: vec![MarketAction::new(PENN, 2), MarketAction::new(PENN, 1)],
            purchase: None,
        };
        let err = rejected(&mut game, &first, &split);
        assert_eq!(err.errors().len(), 1);
        let err = rejected(&mut game, &first, &sell(PENN, 4));
        assert!(err.contains(|e| matches!(
            e,
            GameError::Rule(RuleViolation::NotEnoughShares { held: 3, .. })
        )));

        game.perform_market_turn(&first, &sell(PENN, 2))
            .expect("partial sale is fine");
        assert_eq!(game.global().orphans(PENN), 2);
        assert_eq!(game.player(&first).map(|p| p.cash), Some(250 + 120));
        game.assert_share_conservation();
    }

    #[test]
    fn presidency_moves_to_strictly_larger_holder() {
        let mut game = new_game();
        let order = game.turns().order().to_vec();
        let (first, second) = (order[0].clone(), order[1].clone());
        game.grant(&first, PENN, 2, 60);

        game.perform_market_turn(&first, &MarketTurn::pass())
            .expect("pass");
        game.perform_market_turn(&second, &buy(PENN, 2, None))
            .expect("tie buy");
        assert_eq!(
            game.company(PENN).and_then(|c| c.president.clone()),
            Some(first.clone()),
            "ties keep the incumbent"
        );

        game.pass_market();
        while game.global().phase != Phase::Market {
            game.end_business_turn();
        }
        while game.current_name() != second {
            let name = game.current_name();
            game.perform_market_turn(&name, &MarketTurn::pass())
                .expect("pass");
        }
        game.perform_market_turn(&second, &buy(PENN, 1, None))
            .expect("outbuy");
        assert_eq!(
            game.company(PENN).and_then(|c| c.president.clone()),
            Some(second.clone())
        );

        while game.current_name() != second {
            let name = game.current_name();
            game.perform_market_turn(&name, &MarketTurn::pass())
                .expect("pass");
        }
        game.perform_market_turn(&second, &sell(PENN, 2))
            .expect("sell down");
        assert_eq!(
            game.company(PENN).and_then(|c| c.president.clone()),
            Some(first)
        );
        game.assert_share_conservation();
    }

    #[test]
    fn pass_streak_moves_to_business_phase() {
        let mut game = new_game();
        let first = game.current_name();
        game.perform_market_turn(&first, &buy(PENN, 2, Some(66)))
            .expect("start");
        let second = game.current_name();
        game.perform_market_turn(&second, &buy("Boston & Maine", 2, Some(66)))
            .expect("start");
        let third = game.current_name();
        game.perform_market_turn(&third, &buy("Baltimore & Ohio", 2, Some(60)))
            .expect("start");

        for _ in 0..PLAYERS.len() {
            assert_eq!(game.global().phase, Phase::Market);
            let name = game.current_name();
            game.perform_market_turn(&name, &MarketTurn::pass())
                .expect("pass");
        }
        assert_eq!(game.global().phase, Phase::Business1);
        assert_eq!(
            game.turns().order(),
            [PENN, "Boston & Maine", "Baltimore & Ohio"]
        );
    }
}
