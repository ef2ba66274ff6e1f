#![allow(missing_docs)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A player's liquid assets and stock holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub cash: i64,
    /// Cash plus the market value of all holdings.
    pub net_worth: i64,
    /// Shares held per company; companies with no shares are absent.
    pub stocks: BTreeMap<String, u32>,
}

impl Player {
    pub fn new(name: impl Into<String>, cash: i64) -> Self {
        Self {
            name: name.into(),
            cash,
            net_worth: cash,
            stocks: BTreeMap::new(),
        }
    }

    /// Shares held in `company`.
    pub fn shares(&self, company: &str) -> u32 {
        self.stocks.get(company).copied().unwrap_or(0)
    }

    pub(crate) fn add_shares(&mut self, company: &str, count: u32) {
        if count > 0 {
            *self.stocks.entry(company.to_string()).or_default() += count;
        }
    }

    /// Remove up to `count` shares, dropping the entry once it reaches zero.
    pub(crate) fn remove_shares(&mut self, company: &str, count: u32) {
        if let Some(held) = self.stocks.get_mut(company) {
            *held = held.saturating_sub(count);
            if *held == 0 {
                self.stocks.remove(company);
            }
        }
    }

    /// Recompute net worth from cash and the given share prices.
    pub(crate) fn revalue<F>(&mut self, price_of: F)
    where
        F: Fn(&str) -> u32,
    {
        self.net_worth = self.cash
            + self
                .stocks
                .iter()
                .map(|(company, count)| i64::from(*count) * i64::from(price_of(company)))
                .sum::<i64>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_holdings_are_removed() {
        let mut player = Player::new("a", 250);
        player.add_shares("Erie", 2);
        player.remove_shares("Erie", 1);
        assert_eq!(player.shares("Erie"), 1);
        player.remove_shares("Erie", 1);
        assert!(player.stocks.is_empty());
        player.add_shares("Wabash", 0);
        assert!(player.stocks.is_empty());
    }

    #[test]
    fn revalue_uses_current_prices() {
        let mut player = Player::new("a", 100);
        player.add_shares("Erie", 2);
        player.add_shares("Wabash", 3);
        player.revalue(|company| if company == "Erie" { 66 } else { 50 });
        assert_eq!(player.net_worth, 100 + 132 + 150);
    }
}
