//! City reference data.

use serde::Serialize;

/// Special building rule attached to a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CityException {
    /// Any number of railroads may build here.
    Universal,
    /// The named company is meant to reach this city before anyone else.
    ///
    /// Carried as data only; build order is not enforced.
    Reserved(&'static str),
}

/// A city printed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct City {
    /// Hex coordinate of the city.
    #[serde(skip)]
    pub location: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Revenue indexed by tech level (level 1 at index 0).
    pub revenue: [i64; 6],
    /// Optional building exception.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<CityException>,
    /// Company whose starting track is placed here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting: Option<&'static str>,
}

impl City {
    /// Revenue earned for servicing this city at `tech_level` (1-based).
    pub fn revenue_at(&self, tech_level: u32) -> i64 {
        let index = tech_level.clamp(1, super::MAX_TECH_LEVEL) as usize - 1;
        self.revenue[index]
    }

    /// Whether the city accepts any number of railroads.
    pub fn is_universal(&self) -> bool {
        matches!(self.exception, Some(CityException::Universal))
    }
}

pub(crate) const CITIES: &[City] = &[
    City {
        location: "A30",
        name: "Augusta",
        revenue: [20, 20, 20, 20, 30, 40],
        exception: None,
        starting: None,
    },
    City {
        location: "B27",
        name: "Burlington",
        revenue: [10, 20, 20, 20, 30, 30],
        exception: None,
        starting: None,
    },
    City {
        location: "C28",
        name: "Concord",
        revenue: [20, 20, 20, 20, 20, 30],
        exception: None,
        starting: None,
    },
    City {
        location: "C30",
        name: "Portsmouth",
        revenue: [20, 20, 20, 20, 20, 30],
        exception: None,
        starting: None,
    },
    City {
        location: "D19",
        name: "Buffalo",
        revenue: [20, 30, 30, 40, 50, 60],
        exception: Some(CityException::Reserved("New York Central")),
        starting: Some("Erie"),
    },
    City {
        location: "D21",
        name: "Syracuse",
        revenue: [10, 20, 20, 30, 30, 40],
        exception: Some(CityException::Reserved("New York Central")),
        starting: None,
    },
    City {
        location: "D23",
        name: "Utica",
        revenue: [10, 10, 10, 20, 20, 20],
        exception: Some(CityException::Reserved("New York Central")),
        starting: None,
    },
    City {
        location: "D25",
        name: "Albany",
        revenue: [30, 30, 40, 40, 40, 50],
        exception: Some(CityException::Reserved("New York Central")),
        starting: Some("New York Central"),
    },
    City {
        location: "D29",
        name: "Boston",
        revenue: [30, 30, 40, 40, 40, 50],
        exception: None,
        starting: Some("Boston & Maine"),
    },
    City {
        location: "E4",
        name: "Chicago",
        revenue: [20, 30, 50, 70, 90, 100],
        exception: Some(CityException::Universal),
        starting: Some("New York, Chicago & Saint Louis"),
    },
    City {
        location: "E12",
        name: "Detroit",
        revenue: [20, 30, 40, 60, 80, 90],
        exception: None,
        starting: None,
    },
    City {
        location: "E28",
        name: "Hartford",
        revenue: [20, 20, 20, 30, 30, 30],
        exception: None,
        starting: Some("New York, New Haven & Hartford"),
    },
    City {
        location: "E30",
        name: "Providence",
        revenue: [20, 30, 30, 30, 30, 30],
        exception: None,
        starting: None,
    },
    City {
        location: "F13",
        name: "Cleveland",
        revenue: [20, 30, 40, 50, 60, 60],
        exception: None,
        starting: None,
    },
    City {
        location: "F25",
        name: "New York",
        revenue: [30, 40, 50, 60, 70, 80],
        exception: Some(CityException::Reserved("New York Central")),
        starting: None,
    },
    City {
        location: "F27",
        name: "New Haven",
        revenue: [20, 20, 30, 30, 30, 40],
        exception: None,
        starting: None,
    },
    City {
        location: "G2",
        name: "Springfield",
        revenue: [10, 10, 20, 20, 20, 30],
        exception: None,
        starting: None,
    },
    City {
        location: "G8",
        name: "Fort Wayne",
        revenue: [10, 20, 20, 30, 40, 50],
        exception: None,
        starting: Some("Wabash"),
    },
    City {
        location: "G16",
        name: "Pittsburgh",
        revenue: [20, 30, 40, 60, 70, 80],
        exception: Some(CityException::Reserved("Pennsylvania")),
        starting: None,
    },
    City {
        location: "G20",
        name: "Harrisburg",
        revenue: [10, 10, 20, 20, 20, 20],
        exception: Some(CityException::Reserved("Pennsylvania")),
        starting: None,
    },
    City {
        location: "G24",
        name: "Philadelphia",
        revenue: [30, 40, 40, 40, 50, 60],
        exception: Some(CityException::Reserved("Pennsylvania")),
        starting: Some("Pennsylvania"),
    },
    City {
        location: "H7",
        name: "Indianapolis",
        revenue: [20, 30, 30, 40, 50, 60],
        exception: None,
        starting: None,
    },
    City {
        location: "H15",
        name: "Wheeling",
        revenue: [20, 20, 30, 40, 50, 60],
        exception: None,
        starting: None,
    },
    City {
        location: "H23",
        name: "Baltimore",
        revenue: [20, 30, 30, 40, 40, 50],
        exception: None,
        starting: Some("Baltimore & Ohio"),
    },
    City {
        location: "I0",
        name: "Saint Louis",
        revenue: [30, 40, 50, 60, 70, 90],
        exception: None,
        starting: Some("Illinois Central"),
    },
    City {
        location: "I10",
        name: "Cincinnati",
        revenue: [30, 40, 50, 50, 60, 70],
        exception: None,
        starting: None,
    },
    City {
        location: "I22",
        name: "Washington",
        revenue: [20, 20, 30, 30, 30, 30],
        exception: None,
        starting: None,
    },
    City {
        location: "I24",
        name: "Dover",
        revenue: [10, 10, 10, 20, 20, 20],
        exception: None,
        starting: None,
    },
    City {
        location: "J7",
        name: "Louisville",
        revenue: [20, 30, 30, 40, 40, 50],
        exception: None,
        starting: None,
    },
    City {
        location: "J13",
        name: "Huntington",
        revenue: [10, 10, 20, 30, 30, 40],
        exception: None,
        starting: None,
    },
    City {
        location: "J21",
        name: "Richmond",
        revenue: [30, 30, 20, 20, 20, 30],
        exception: None,
        starting: Some("Chesapeake & Ohio"),
    },
    City {
        location: "K2",
        name: "Cairo",
        revenue: [10, 20, 20, 20, 20, 20],
        exception: None,
        starting: None,
    },
    City {
        location: "K10",
        name: "Lexington",
        revenue: [10, 20, 20, 30, 30, 30],
        exception: None,
        starting: None,
    },
    City {
        location: "K16",
        name: "Roanoke",
        revenue: [20, 20, 20, 20, 20, 20],
        exception: None,
        starting: None,
    },
    City {
        location: "K22",
        name: "Norfolk",
        revenue: [20, 20, 30, 30, 30, 40],
        exception: None,
        starting: None,
    },
];
