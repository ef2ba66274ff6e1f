//! First step of a company's business turn: equipment, track and coal.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GameState;
use crate::board::{self, MAX_TECH_LEVEL};
use crate::error::{finish, GameError, RuleViolation, TurnResult};
use crate::models::{Company, TurnStage};

/// Cash received per unit of scrapped equipment, multiplied by the equipment's level.
const SCRAP_VALUE: i64 = 20;

/// Changes a president makes to their company's holdings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInventory {
    /// Units of equipment to scrap, by tech level.
    #[serde(default)]
    pub scrap: [u32; 6],
    /// Trains to buy.
    #[serde(default)]
    pub buy: u32,
    /// Hexes to build track on.
    #[serde(default)]
    pub track: Vec<String>,
    /// Hex to mine coal from.
    #[serde(default)]
    pub coal: Option<String>,
}

impl CompanyInventory {
    fn coal(&self) -> Option<&str> {
        self.coal.as_deref().filter(|hex| !hex.is_empty())
    }
}

impl GameState {
    /// Validate and apply the acting company's inventory update, then move it on to
    /// earnings.
    pub fn update_company_inventory(
        &mut self,
        player_name: &str,
        update: &CompanyInventory,
    ) -> TurnResult {
        let company = self.acting_company(
            player_name,
            TurnStage::Inventory,
            "has already updated its inventory",
        )?;

        let mut errors = self.validate_expenses(company, update);
        errors.extend(self.validate_build_limits(company, update));
        errors.extend(self.validate_city_capacity(update));
        finish(errors)?;

        let name = company.name.clone();
        self.apply_inventory(&name, update);
        self.set_stage(&name, TurnStage::Earnings);
        Ok(())
    }

    fn validate_expenses(&self, company: &Company, update: &CompanyInventory) -> Vec<GameError> {
        let mut errors = Vec::new();

        let mut available = company.treasury;
        for (index, (&scrap, &held)) in update.scrap.iter().zip(&company.equipment).enumerate() {
            let level = index as u32 + 1;
            if scrap > held {
                errors.push(
                    RuleViolation::NotEnoughEquipment {
                        company: company.name.clone(),
                        held,
                        tech_level: level,
                    }
                    .into(),
                );
            }
            available += SCRAP_VALUE * i64::from(level) * i64::from(scrap.min(held));
        }

        let mut needed = 0;
        for hex in &update.track {
            match board::build_cost(hex) {
                cost if cost > 0 => needed += cost,
                _ => errors.push(RuleViolation::Unbuildable(hex.clone()).into()),
            }
        }
        let bought = self.global.trains_bought;
        for number in 1..=update.buy {
            if needed > available {
                break;
            }
            needed += board::train_cost(bought.saturating_add(number));
        }

        if needed > available {
            errors.push(
                RuleViolation::InsufficientTreasury {
                    company: company.name.clone(),
                    needed,
                    available,
                }
                .into(),
            );
        }
        errors
    }

    fn validate_build_limits(&self, company: &Company, update: &CompanyInventory) -> Vec<GameError> {
        let mut errors = Vec::new();

        if let Some(coal) = update.coal() {
            if !update.track.is_empty() {
                errors.push(RuleViolation::TrackAndCoal.into());
            }
            if !self.global.unmined_coal.iter().any(|hex| hex == coal) {
                errors.push(RuleViolation::NoCoal(coal.to_string()).into());
            }
            if !company.has_track(coal) {
                errors.push(
                    RuleViolation::NoTrackForCoal {
                        company: company.name.clone(),
                        hex: coal.to_string(),
                    }
                    .into(),
                );
            }
        }

        let building = update.track.len();
        if building > company.unbuilt_track as usize {
            errors.push(
                RuleViolation::TrackBudget {
                    company: company.name.clone(),
                    remaining: company.unbuilt_track,
                }
                .into(),
            );
        }
        let limit = self.tech_level_after(update.buy);
        if building > limit as usize {
            errors.push(RuleViolation::BuildLimit { limit }.into());
        }

        let mut listed = HashSet::new();
        for hex in &update.track {
            if company.has_track(hex) {
                errors.push(
                    RuleViolation::AlreadyBuilt {
                        company: company.name.clone(),
                        hex: hex.clone(),
                    }
                    .into(),
                );
            } else if !listed.insert(hex.as_str()) {
                errors.push(RuleViolation::DuplicateHex { hex: hex.clone() }.into());
            }
        }
        if !board::tiles_contiguous(&company.built_track, &update.track) {
            errors.push(RuleViolation::Disconnected.into());
        }
        errors
    }

    /// Each city takes as many railroads as the tech level reached this turn, but never
    /// fewer than two. Universal cities take any number.
    fn validate_city_capacity(&self, update: &CompanyInventory) -> Vec<GameError> {
        let capacity = self.tech_level_after(update.buy).max(2) as usize;

        board::cities(&update.track)
            .into_iter()
            .filter(|city| !city.is_universal())
            .filter_map(|city| {
                let railroads = self
                    .companies
                    .values()
                    .filter(|company| company.has_track(city.location))
                    .count();
                (railroads >= capacity).then(|| {
                    GameError::from(RuleViolation::CityFull {
                        city: city.name.to_string(),
                        railroads,
                    })
                })
            })
            .collect()
    }

    fn tech_level_after(&self, buy: u32) -> u32 {
        board::tech_level(self.global.trains_bought.saturating_add(buy))
    }

    fn apply_inventory(&mut self, name: &str, update: &CompanyInventory) {
        let Some(company) = self.companies.get_mut(name) else {
            return;
        };

        for (index, &scrap) in update.scrap.iter().enumerate() {
            company.treasury += SCRAP_VALUE * (index as i64 + 1) * i64::from(scrap);
            company.equipment[index] -= scrap;
        }

        for _ in 0..update.buy {
            self.global.trains_bought += 1;
            self.global.tech_level = board::tech_level(self.global.trains_bought);
            company.treasury -= board::train_cost(self.global.trains_bought);
            let level = self.global.tech_level.clamp(1, MAX_TECH_LEVEL);
            company.equipment[level as usize - 1] += 1;
        }

        if let Some(coal) = update.coal() {
            company.coal_mined += 1;
            self.global.unmined_coal.retain(|hex| hex != coal);
        }

        company.unbuilt_track -= update.track.len() as u32;
        company.add_track(update.track.iter().cloned());

        debug!(
            company = name,
            treasury = company.treasury,
            equipment = ?company.equipment,
            trains_bought = self.global.trains_bought,
            tech_level = self.global.tech_level,
            "inventory updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::error::{ErrorKind, Rejected};

    const PENN: &str = "Pennsylvania";
    const NYC: &str = "New York Central";

    fn rejected(game: &mut GameState, player: &str, update: &CompanyInventory) -> Rejected {
        let before = game.clone();
        let err = game
            .update_company_inventory(player, update)
            .expect_err("update should be rejected");
        assert_eq!(*game, before, "rejected update changed the game");
        err
    }

    fn has_rule(err: &Rejected, predicate: impl Fn(&RuleViolation) -> bool) -> bool {
        err.contains(|e| matches!(e, GameError::Rule(rule) if predicate(rule)))
    }

    #[test]
    fn buying_trains_raises_tech_level() {
        let mut game = business_game();
        let update = CompanyInventory {
            buy: 2,
            ..CompanyInventory::default()
        };
        game.update_company_inventory("a", &update)
            .expect("affordable trains");

        let company = game.company(PENN).expect("company");
        assert_eq!(company.treasury, 300 - 100 - 90);
        assert_eq!(company.equipment, [2, 0, 0, 0, 0, 0]);
        assert_eq!(company.turn_stage, TurnStage::Earnings);
        assert_eq!(game.global().trains_bought, 2);
        assert_eq!(game.global().tech_level, 1);

        let err = rejected(&mut game, "a", &update);
        assert_eq!(err.errors()[0].kind(), ErrorKind::Turn);
    }

    #[test]
    fn sixth_train_is_first_of_level_two() {
        let mut game = business_game();
        game.global_mut().trains_bought = 5;
        game.company_mut(PENN).equipment = [1, 0, 0, 0, 0, 0];
        let update = CompanyInventory {
            scrap: [1, 0, 0, 0, 0, 0],
            buy: 1,
            ..CompanyInventory::default()
        };
        game.update_company_inventory("a", &update)
            .expect("scrap and buy");
        let company = game.company(PENN).expect("company");
        assert_eq!(company.equipment, [0, 1, 0, 0, 0, 0]);
        assert_eq!(company.treasury, 300 + 20 - 140);
        assert_eq!(game.global().tech_level, 2);
    }

    #[test]
    fn track_and_coal() {
        let mut game = business_game();
        let track = CompanyInventory {
            track: vec!["H23".into()],
            ..CompanyInventory::default()
        };
        game.update_company_inventory("a", &track)
            .expect("adjacent track");
        let company = game.company(PENN).expect("company");
        assert_eq!(company.built_track, vec!["G24", "H23"]);
        assert_eq!(company.unbuilt_track, 15);
        // Build cost is only checked for affordability, never charged.
        assert_eq!(company.treasury, 300);
    }

    #[test]
    fn mining_needs_coal_and_track() {
        let mut game = business_game();
        game.company_mut(PENN).add_track(["H17".to_string()]);
        let update = CompanyInventory {
            coal: Some("H17".into()),
            ..CompanyInventory::default()
        };
        game.update_company_inventory("a", &update)
            .expect("coal on own track");
        assert_eq!(game.company(PENN).map(|c| c.coal_mined), Some(1));
        assert!(!game.global().unmined_coal.iter().any(|hex| hex == "H17"));

        let mut game = business_game();
        let update = CompanyInventory {
            track: vec!["H23".into()],
            coal: Some("G24".into()),
            ..CompanyInventory::default()
        };
        let err = rejected(&mut game, "a", &update);
        assert!(has_rule(&err, |r| *r == RuleViolation::TrackAndCoal));
        assert!(has_rule(&err, |r| matches!(r, RuleViolation::NoCoal(_))));
        assert!(!has_rule(&err, |r| matches!(r, RuleViolation::NoTrackForCoal { .. })));

        let update = CompanyInventory {
            coal: Some("G18".into()),
            ..CompanyInventory::default()
        };
        let err = rejected(&mut game, "a", &update);
        assert_eq!(err.errors().len(), 1);
        assert!(has_rule(&err, |r| matches!(r, RuleViolation::NoTrackForCoal { .. })));
    }

    #[test]
    fn build_rules_are_all_reported() {
        let mut game = business_game();
        let update = CompanyInventory {
            track: vec!["G24".into(), "A26".into(), "K2".into()],
            ..CompanyInventory::default()
        };
        let err = rejected(&mut game, "a", &update);
        assert!(has_rule(&err, |r| matches!(r, RuleViolation::AlreadyBuilt { .. })));
        assert!(has_rule(&err, |r| matches!(r, RuleViolation::Unbuildable(hex) if hex == "A26")));
        assert!(has_rule(&err, |r| *r == RuleViolation::BuildLimit { limit: 1 }));
        assert!(has_rule(&err, |r| *r == RuleViolation::Disconnected));

        let update = CompanyInventory {
            track: vec!["H23".into(), "H23".into()],
            buy: 6,
            ..CompanyInventory::default()
        };
        game.company_mut(PENN).treasury = 10_000;
        let err = rejected(&mut game, "a", &update);
        assert_eq!(
            err.errors(),
            [GameError::Rule(RuleViolation::DuplicateHex { hex: "H23".into() })]
        );
    }

    #[test]
    fn expenses_must_be_covered() {
        let mut game = business_game();
        let update = CompanyInventory {
            scrap: [1, 0, 0, 0, 0, 0],
            buy: 4,
            ..CompanyInventory::default()
        };
        let err = rejected(&mut game, "a", &update);
        assert!(has_rule(&err, |r| matches!(
            r,
            RuleViolation::NotEnoughEquipment { held: 0, tech_level: 1, .. }
        )));
        assert!(has_rule(&err, |r| matches!(
            r,
            RuleViolation::InsufficientTreasury { available: 300, .. }
        )));

        let update = CompanyInventory {
            buy: u32::MAX,
            ..CompanyInventory::default()
        };
        let err = rejected(&mut game, "a", &update);
        assert!(has_rule(&err, |r| matches!(r, RuleViolation::InsufficientTreasury { .. })));
    }

    #[test]
    fn universal_cities_have_no_railroad_cap() {
        let mut game = business_game();
        game.company_mut(PENN).built_track = vec!["E6".into()];
        for other in ["New York, Chicago & Saint Louis", NYC, "Erie"] {
            game.company_mut(other).built_track = vec!["E4".into()];
        }
        let update = CompanyInventory {
            track: vec!["E4".into()],
            ..CompanyInventory::default()
        };
        game.update_company_inventory("a", &update)
            .expect("Chicago takes any number of railroads");
        assert!(game.company(PENN).is_some_and(|c| c.has_track("E4")));
    }

    #[test]
    fn track_budget_limits_building() {
        let mut game = business_game();
        game.company_mut(PENN).unbuilt_track = 0;
        let update = CompanyInventory {
            track: vec!["H23".into()],
            ..CompanyInventory::default()
        };
        let err = rejected(&mut game, "a", &update);
        assert_eq!(
            err.errors(),
            [GameError::Rule(RuleViolation::TrackBudget {
                company: PENN.into(),
                remaining: 0,
            })]
        );
    }

    #[test]
    fn crowded_cities_refuse_new_railroads() {
        let mut game = business_game();
        // Baltimore & Ohio starts on H23; a second railroad fills it at tech level 1.
        game.company_mut("Baltimore & Ohio").built_track = vec!["H23".into()];
        game.company_mut(NYC).built_track = vec!["H23".into()];
        let update = CompanyInventory {
            track: vec!["H23".into()],
            ..CompanyInventory::default()
        };
        let err = rejected(&mut game, "a", &update);
        assert!(has_rule(&err, |r| matches!(r, RuleViolation::CityFull { railroads: 2, .. })));

        game.global_mut().trains_bought = 11;
        game.global_mut().tech_level = 3;
        game.company_mut(PENN).equipment = [0, 0, 1, 0, 0, 0];
        game.update_company_inventory("a", &update)
            .expect("tech level 3 makes room");
    }

    #[test]
    fn only_the_president_acts() {
        let mut game = business_game();
        let err = rejected(&mut game, "b", &CompanyInventory::default());
        assert_eq!(
            err.errors(),
            [GameError::NotPresident {
                company: PENN.into(),
                president: Some("a".into()),
            }]
        );
        let err = rejected(&mut game, "nobody", &CompanyInventory::default());
        assert_eq!(err.errors()[0].kind(), ErrorKind::NotFound);

        let mut market = new_game();
        let err = rejected(&mut market, "a", &CompanyInventory::default());
        assert_eq!(err.errors()[0].kind(), ErrorKind::Phase);
    }
}
