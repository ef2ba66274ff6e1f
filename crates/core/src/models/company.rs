#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use super::PriceStamp;

/// Shares issued by every company.
pub const SHARES_PER_COMPANY: u32 = 10;

/// Where a company is within its business turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStage {
    /// Not the company's turn.
    #[default]
    #[serde(rename = "")]
    Idle,
    /// Waiting for the inventory update.
    Inventory,
    /// Waiting for earnings to be handled.
    Earnings,
}

/// A railroad company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// Only startable from tech level 3.
    pub restricted: bool,
    pub president: Option<String>,
    /// Zero until the company is started.
    pub stock_price: u32,
    pub price_changed: PriceStamp,
    /// Unsold shares still held by the company.
    pub held_stock: u32,
    pub net_income: i64,
    pub treasury: i64,
    pub coal_mined: u32,
    pub unbuilt_track: u32,
    /// Sorted, without duplicates.
    pub built_track: Vec<String>,
    /// Equipment units by tech level, level 1 at index 0.
    pub equipment: [u32; 6],
    #[serde(default)]
    pub turn_stage: TurnStage,
}

impl Company {
    pub fn new(name: impl Into<String>, restricted: bool, order: u32, track_budget: u32) -> Self {
        Self {
            name: name.into(),
            restricted,
            president: None,
            stock_price: 0,
            price_changed: PriceStamp {
                round: 0,
                phase: 0,
                turn: order,
            },
            held_stock: SHARES_PER_COMPANY,
            net_income: 0,
            treasury: 0,
            coal_mined: 0,
            unbuilt_track: track_budget,
            built_track: Vec::new(),
            equipment: [0; 6],
            turn_stage: TurnStage::Idle,
        }
    }

    pub fn is_started(&self) -> bool {
        self.stock_price != 0
    }

    pub fn is_president(&self, player: &str) -> bool {
        self.president.as_deref() == Some(player)
    }

    pub fn has_track(&self, hex: &str) -> bool {
        self.built_track
            .binary_search_by(|built| built.as_str().cmp(hex))
            .is_ok()
    }

    /// Total equipment units across all tech levels.
    pub fn equipment_units(&self) -> u32 {
        self.equipment.iter().sum()
    }

    /// Number of cities the company's equipment can service.
    pub fn service_capacity(&self) -> usize {
        self.equipment
            .iter()
            .enumerate()
            .map(|(index, count)| (index + 1) * *count as usize)
            .sum()
    }

    /// Add track while keeping the list sorted and unique.
    pub fn add_track<I: IntoIterator<Item = String>>(&mut self, hexes: I) {
        self.built_track.extend(hexes);
        self.built_track.sort();
        self.built_track.dedup();
    }
}
