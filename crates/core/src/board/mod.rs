//! Static board reference data and the pure rules built on top of it.
//!
//! The tables here never change during or between games. They are assembled into a single
//! lookup structure on first use and checked for consistency at that point, so a broken
//! table fails immediately rather than in the middle of a game. Everything exposed is a
//! pure function and safe to call from any number of games at once.

pub mod cities;
pub mod costs;
pub mod geometry;
pub mod hex;
pub mod stock;

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use serde::Serialize;

pub use cities::{City, CityException};
pub use costs::{all_train_costs, tech_level, train_cost, TOTAL_TRAINS};
pub use geometry::{tiles_adjacent, tiles_contiguous};
pub use hex::HexCoord;
pub use stock::{
    is_ladder_price, next_stock_price, prev_stock_price, starting_stock_prices, STOCK_PRICES,
};

/// Highest tech level in the game.
pub const MAX_TECH_LEVEL: u32 = 6;
/// Trains sold per tech level.
pub const TRAINS_PER_LEVEL: u32 = 5;

const STARTING_COAL: [&str; 5] = ["G18", "H17", "I16", "J15", "K14"];

/// Everything known about a single buildable hex.
#[derive(Debug, Clone, Serialize)]
pub struct HexInfo {
    /// Cost to build track on the hex.
    pub build_cost: i64,
    /// City printed on the hex, if any.
    pub city: Option<&'static City>,
    /// Whether the hex starts the game with a coal deposit.
    pub coal: bool,
}

struct Board {
    hexes: BTreeMap<String, HexInfo>,
    starting_locations: BTreeMap<&'static str, &'static str>,
}

static BOARD: Lazy<Board> = Lazy::new(|| Board::build().expect("invalid static board data"));

impl Board {
    fn build() -> Result<Self, String> {
        let mut hexes = BTreeMap::new();
        for &(row, first_col, costs) in costs::BUILD_COST_ROWS {
            for (offset, &build_cost) in costs.iter().enumerate() {
                if build_cost <= 0 {
                    continue;
                }
                let coord = format!("{row}{}", first_col + 2 * offset as u32);
                if HexCoord::parse(&coord).is_none() {
                    return Err(format!("malformed build cost coordinate {coord:?}"));
                }
                let info = HexInfo {
                    build_cost,
                    city: None,
                    coal: false,
                };
                if hexes.insert(coord.clone(), info).is_some() {
                    return Err(format!("duplicate build cost entry for {coord}"));
                }
            }
        }

        let mut starting_locations = BTreeMap::new();
        let mut seen = HashSet::new();
        for city in cities::CITIES {
            if !seen.insert(city.location) {
                return Err(format!("duplicate city at {}", city.location));
            }
            let hex = hexes
                .get_mut(city.location)
                .ok_or_else(|| format!("city {} sits on an unbuildable hex", city.name))?;
            hex.city = Some(city);
            if let Some(company) = city.starting {
                if starting_locations.insert(company, city.location).is_some() {
                    return Err(format!("{company} has more than one starting city"));
                }
            }
        }

        for coord in STARTING_COAL {
            let hex = hexes
                .get_mut(coord)
                .ok_or_else(|| format!("coal deposit {coord} sits on an unbuildable hex"))?;
            hex.coal = true;
        }

        Ok(Self {
            hexes,
            starting_locations,
        })
    }
}

/// Cost to build track on `hex`, or 0 when the hex cannot be built on.
pub fn build_cost(hex: &str) -> i64 {
    BOARD.hexes.get(hex).map(|info| info.build_cost).unwrap_or(0)
}

/// The city on `hex`, if there is one.
pub fn city(hex: &str) -> Option<&'static City> {
    BOARD.hexes.get(hex).and_then(|info| info.city)
}

/// Cities found among `coords`, in the order given.
///
/// Coordinates without a city are skipped, so a shorter result than input tells the caller
/// that some coordinates were not cities.
pub fn cities<I, S>(coords: I) -> Vec<&'static City>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    coords
        .into_iter()
        .filter_map(|coord| city(coord.as_ref()))
        .collect()
}

/// Order cities by descending revenue at `tech_level`.
pub fn sort_cities(list: &mut [&'static City], tech_level: u32) {
    list.sort_by(|a, b| b.revenue_at(tech_level).cmp(&a.revenue_at(tech_level)));
}

/// Hex where `company` places its first track.
pub fn starting_location(company: &str) -> Option<&'static str> {
    BOARD.starting_locations.get(company).copied()
}

/// Hexes holding coal at the start of the game.
pub fn starting_coal() -> Vec<String> {
    STARTING_COAL.iter().map(|coord| coord.to_string()).collect()
}

/// Every buildable hex keyed by coordinate.
pub fn board_map() -> &'static BTreeMap<String, HexInfo> {
    &BOARD.hexes
}
