//! The stock price ladder.

/// Every legal stock price, ascending.
pub const STOCK_PRICES: [u32; 26] = [
    34, 37, 41, 45, 50, 55, 60, 66, 74, 82, 91, 100, 110, 121, 133, 148, 160, 176, 194, 213, 234,
    257, 282, 310, 341, 375,
];

const TOP: usize = STOCK_PRICES.len() - 1;

/// Whether `price` sits on the ladder.
pub fn is_ladder_price(price: u32) -> bool {
    STOCK_PRICES.binary_search(&price).is_ok()
}

/// One step up the ladder, clamped at the top.
///
/// An off-ladder price is rounded up to the next ladder value and goes no further.
pub fn next_stock_price(current: u32) -> u32 {
    match STOCK_PRICES.binary_search(&current) {
        Ok(index) => STOCK_PRICES[(index + 1).min(TOP)],
        Err(index) => STOCK_PRICES[index.min(TOP)],
    }
}

/// One step down the ladder, clamped at the bottom.
///
/// An off-ladder price is rounded down to the ladder value immediately below it.
pub fn prev_stock_price(current: u32) -> u32 {
    match STOCK_PRICES.binary_search(&current) {
        Ok(index) | Err(index) => STOCK_PRICES[index.saturating_sub(1)],
    }
}

/// The three prices a company may be started at during `tech_level`.
pub fn starting_stock_prices(tech_level: u32) -> [u32; 3] {
    let offset = tech_level.clamp(1, super::MAX_TECH_LEVEL) as usize;
    [
        STOCK_PRICES[4 + offset],
        STOCK_PRICES[5 + offset],
        STOCK_PRICES[6 + offset],
    ]
}
