//! Track build costs and the train price schedule.

use tracing::warn;

use super::{MAX_TECH_LEVEL, TRAINS_PER_LEVEL};

/// Buildable hexes, row by row: `(row, first column, costs)`.
///
/// Columns step by two from the first column. A zero cost marks water or otherwise
/// unbuildable terrain inside the row's span.
pub(crate) const BUILD_COST_ROWS: &[(char, u32, &[i64])] = &[
    ('A', 28, &[20, 40]),
    ('B', 25, &[40, 30, 20]),
    ('C', 20, &[20, 40, 40, 60, 40, 30]),
    ('D', 17, &[20, 30, 20, 20, 30, 40, 40]),
    (
        'E',
        2,
        &[10, 20, 10, 10, 10, 20, 0, 0, 20, 40, 60, 40, 60, 30, 30],
    ),
    (
        'F',
        1,
        &[10, 10, 10, 10, 10, 10, 20, 40, 60, 80, 60, 40, 60, 30],
    ),
    (
        'G',
        0,
        &[10, 10, 10, 10, 10, 10, 20, 40, 60, 100, 20, 40, 40],
    ),
    ('H', 1, &[10, 10, 10, 20, 10, 20, 40, 60, 100, 80, 40, 30]),
    (
        'I',
        0,
        &[20, 10, 10, 10, 20, 30, 40, 60, 100, 80, 40, 30, 20],
    ),
    ('J', 1, &[10, 20, 20, 20, 20, 40, 60, 100, 80, 60, 30, 30]),
    ('K', 2, &[10, 20, 20, 40, 30, 60, 100, 60, 80, 40, 30]),
];

/// Price of every train, grouped by the tech level it belongs to.
const TRAIN_COSTS: [[i64; TRAINS_PER_LEVEL as usize]; MAX_TECH_LEVEL as usize] = [
    [100, 90, 90, 80, 80],
    [140, 130, 120, 120, 110],
    [190, 180, 170, 160, 150],
    [280, 260, 250, 240, 230],
    [380, 360, 340, 320, 300],
    [500, 460, 430, 400, 380],
];

/// Total number of trains in the schedule.
pub const TOTAL_TRAINS: u32 = TRAINS_PER_LEVEL * MAX_TECH_LEVEL;

/// Cost of the `number`-th train bought in the game (1-based).
///
/// Numbers outside the schedule are clamped to its first or last entry.
pub fn train_cost(number: u32) -> i64 {
    let clamped = number.clamp(1, TOTAL_TRAINS);
    if clamped != number {
        warn!(number, "train number outside the cost schedule, using train #{clamped}");
    }
    let index = (clamped - 1) as usize;
    let per_level = TRAINS_PER_LEVEL as usize;
    TRAIN_COSTS[index / per_level][index % per_level]
}

/// The whole train schedule, one inner list per tech level.
pub fn all_train_costs() -> Vec<Vec<i64>> {
    TRAIN_COSTS.iter().map(|level| level.to_vec()).collect()
}

/// Tech level reached after `trains_bought` trains have been purchased game-wide.
///
/// A level is entered when its first train is bought. The result is capped at
/// [`MAX_TECH_LEVEL`](super::MAX_TECH_LEVEL), so trains bought past the schedule do not
/// raise it further.
pub fn tech_level(trains_bought: u32) -> u32 {
    if trains_bought == 0 {
        return 1;
    }
    ((trains_bought - 1) / TRAINS_PER_LEVEL + 1).min(MAX_TECH_LEVEL)
}
