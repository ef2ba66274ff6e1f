//! Hex coordinate parsing.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// A parsed board coordinate such as `I22`: a row letter followed by a column number.
///
/// Columns use the doubled convention of the printed map, so a row only ever holds
/// even or only odd column numbers and neighbours in the same row sit two columns apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexCoord {
    /// Row letter as an ASCII byte (`b'A'` is the northernmost row).
    pub row: u8,
    /// Doubled column index.
    pub col: u32,
}

static COORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z])(\d{1,3})$").expect("failed to compile hex coordinate regex"));

impl HexCoord {
    /// Parse a coordinate, returning `None` for anything that is not `<letter><number>`.
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = COORD_RE.captures(raw)?;
        let row = *caps.get(1)?.as_str().as_bytes().first()?;
        let col = caps.get(2)?.as_str().parse::<u32>().ok()?;
        Some(Self { row, col })
    }

    /// Number of rows between the two coordinates.
    pub fn row_distance(&self, other: &Self) -> u32 {
        u32::from(self.row.abs_diff(other.row))
    }

    /// Number of doubled columns between the two coordinates.
    pub fn col_distance(&self, other: &Self) -> u32 {
        self.col.abs_diff(other.col)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(self.row), self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_board_coordinates() {
        let coord = HexCoord::parse("I22").expect("valid coordinate");
        assert_eq!(coord.row, b'I');
        assert_eq!(coord.col, 22);
        assert_eq!(coord.to_string(), "I22");
    }

    #[test]
    fn rejects_malformed_coordinates() {
        for raw in ["", "IJK", "GONE", "22", "i22", "I", "I22x"] {
            assert!(HexCoord::parse(raw).is_none(), "{raw:?} should not parse");
        }
    }
}
