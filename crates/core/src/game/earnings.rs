//! Second step of a company's business turn: revenue, stock price and dividends.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::GameState;
use crate::board::{self, City};
use crate::error::{finish, GameError, RuleViolation, TurnResult};
use crate::models::{Company, PriceStamp, TurnStage, SHARES_PER_COMPANY};

/// Stock price a company restarts at after receivership.
pub const RECEIVERSHIP_PRICE: u32 = 50;

/// Income per unit of mined coal, paid only to companies with equipment.
const COAL_REVENUE: i64 = 40;
/// Running cost per equipment unit and tech level.
const OPERATING_COST: i64 = 10;

/// How a president wants the company's earnings handled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEarnings {
    /// Cities to service. Empty means pick the most lucrative ones the equipment can reach.
    #[serde(default)]
    pub serviced: Vec<String>,
    /// Pay the net income out to shareholders instead of keeping it.
    #[serde(default)]
    pub dividends: bool,
}

impl GameState {
    /// Validate and apply the acting company's earnings, then end its business turn.
    pub fn handle_company_earnings(
        &mut self,
        player_name: &str,
        earnings: &CompanyEarnings,
    ) -> TurnResult {
        let company = self.acting_company(
            player_name,
            TurnStage::Earnings,
            "is not ready to handle its earnings",
        )?;
        let tech_level = self.global.tech_level;

        let serviced = if earnings.serviced.is_empty() {
            best_cities(company, tech_level)
        } else {
            finish(validate_serviced(company, &earnings.serviced))?;
            board::cities(&earnings.serviced)
        };

        let units = i64::from(company.equipment_units());
        let costs = OPERATING_COST * i64::from(tech_level) * units;
        let mut gross: i64 = serviced.iter().map(|city| city.revenue_at(tech_level)).sum();
        if units > 0 {
            gross += COAL_REVENUE * i64::from(company.coal_mined);
        }
        let net = gross - costs;
        debug!(company = %company.name, gross, costs, net, serviced = serviced.len(), "earnings computed");

        let name = company.name.clone();
        self.settle_earnings(&name, net, earnings.dividends);
        self.end_business_turn();
        Ok(())
    }

    fn settle_earnings(&mut self, name: &str, net: i64, dividends: bool) {
        let stamp = self.global.stamp(self.turns.cursor());
        let Some(company) = self.companies.get(name) else {
            return;
        };
        let (price_before, prior) = (company.stock_price, company.net_income);

        let penalized = net <= 0;
        let net = if penalized {
            self.penalize_unprofitable(name, stamp);
            0
        } else {
            if let Some(company) = self.companies.get_mut(name) {
                if net < prior {
                    company.stock_price = board::prev_stock_price(company.stock_price);
                    company.price_changed = stamp;
                } else if net > prior && dividends {
                    company.stock_price = board::next_stock_price(company.stock_price);
                    company.price_changed = stamp;
                }
            }
            net
        };

        let mut paid_out = 0;
        if dividends {
            let per_share = net / i64::from(SHARES_PER_COMPANY);
            for player in self.players.values_mut() {
                let payment = per_share * i64::from(player.shares(name));
                player.cash += payment;
                player.net_worth += payment;
                paid_out += payment;
            }
        }

        let Some(company) = self.companies.get_mut(name) else {
            return;
        };
        company.net_income = net;
        company.treasury += net - paid_out;
        let price_changed = company.stock_price != price_before;
        debug!(company = name, net, paid_out, price = company.stock_price, "earnings settled");

        // The penalty moves a share even when the price is already at the floor.
        if price_changed || penalized {
            self.revalue_players();
        }
    }

    /// Drop the price two steps and take a share from the president. A company left with
    /// no player shareholders goes into receivership.
    fn penalize_unprofitable(&mut self, name: &str, stamp: PriceStamp) {
        let Some(company) = self.companies.get_mut(name) else {
            return;
        };
        company.stock_price = board::prev_stock_price(board::prev_stock_price(company.stock_price));
        company.price_changed = stamp;

        let president = company.president.clone().unwrap_or_default();
        if let Some(player) = self.players.get_mut(&president) {
            if player.shares(name) > 0 {
                player.remove_shares(name, 1);
                company.held_stock += 1;
            }
        }

        let successor = self.largest_holder(name, &president);
        let Some(company) = self.companies.get_mut(name) else {
            return;
        };
        if successor.is_some() {
            company.president = successor;
            return;
        }

        info!(company = name, price = RECEIVERSHIP_PRICE, "company enters receivership");
        self.global.orphan_stocks.remove(name);
        company.president = None;
        company.held_stock = SHARES_PER_COMPANY;
        company.treasury = 0;
        company.equipment = [0; 6];
        company.stock_price = RECEIVERSHIP_PRICE;
    }
}

/// The company's cities on its own track, most lucrative first, as many as it can service.
fn best_cities(company: &Company, tech_level: u32) -> Vec<&'static City> {
    let mut cities = board::cities(&company.built_track);
    board::sort_cities(&mut cities, tech_level);
    cities.truncate(company.service_capacity());
    cities
}

fn validate_serviced(company: &Company, serviced: &[String]) -> Vec<GameError> {
    let mut errors = Vec::new();

    let capacity = company.service_capacity();
    if serviced.len() > capacity {
        errors.push(
            RuleViolation::ServiceCapacity {
                company: company.name.clone(),
                capacity,
            }
            .into(),
        );
    }

    let mut listed = HashSet::new();
    for hex in serviced {
        if !listed.insert(hex.as_str()) {
            errors.push(RuleViolation::DuplicateHex { hex: hex.clone() }.into());
        }
    }

    let cities = board::cities(serviced);
    if cities.len() != serviced.len() {
        errors.push(RuleViolation::NotACity.into());
    }
    for city in cities {
        if !company.has_track(city.location) {
            errors.push(
                RuleViolation::NotPresent {
                    company: company.name.clone(),
                    city: city.name.to_string(),
                }
                .into(),
            );
        }
    }
    errors
}
