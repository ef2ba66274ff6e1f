//! Adjacency and contiguity over board hexes.

use tracing::warn;

use super::hex::HexCoord;

/// Hex pairs separated by an impassable border, regardless of their coordinates.
const IMPASSABLE_BORDERS: [(&str, &str); 2] = [("I22", "I24"), ("E12", "F13")];

fn parse_logged(raw: &str) -> Option<HexCoord> {
    let parsed = HexCoord::parse(raw);
    if parsed.is_none() {
        warn!("failed to parse hex coordinate {raw:?}");
    }
    parsed
}

/// Whether two hexes share an edge.
///
/// Same-row neighbours are two doubled columns apart and neighbours in adjacent rows one
/// column apart, so the row and column distances of neighbours always sum to two.
/// Malformed coordinates are never adjacent to anything.
pub fn tiles_adjacent(a: &str, b: &str) -> bool {
    let blocked = IMPASSABLE_BORDERS
        .iter()
        .any(|&(first, second)| (a == first && b == second) || (a == second && b == first));
    if blocked {
        return false;
    }

    let (Some(first), Some(second)) = (parse_logged(a), parse_logged(b)) else {
        return false;
    };
    let rows = first.row_distance(&second);
    rows <= 1 && rows + first.col_distance(&second) == 2
}

/// Whether every hex in `candidates` connects back to `existing` once both are built.
///
/// Candidates next to the connected frontier join it; the rest are retried against the
/// newly joined hexes until either nothing is left or a pass connects nothing.
pub fn tiles_contiguous<E, C>(existing: &[E], candidates: &[C]) -> bool
where
    E: AsRef<str>,
    C: AsRef<str>,
{
    let mut frontier: Vec<&str> = existing.iter().map(AsRef::as_ref).collect();
    let mut pending: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();

    while !pending.is_empty() {
        let (connected, isolated): (Vec<&str>, Vec<&str>) = pending.into_iter().partition(|hex| {
            frontier
                .iter()
                .any(|reached| tiles_adjacent(hex, reached))
        });
        if connected.is_empty() {
            return false;
        }
        frontier = connected;
        pending = isolated;
    }
    true
}
