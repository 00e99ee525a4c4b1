//! Agreement item codes and the lookup tables used by the evaluators.

use std::collections::HashMap;

/// Item codes published by the hotel catalog.
pub mod codes {
    pub const VIEW_SEA: &str = "V001";
    pub const VIEW_RIVER: &str = "V002";
    pub const VIEW_POOL: &str = "V003";
    pub const VIEW_GARDEN: &str = "V004";
    pub const VIEW_CITY: &str = "V005";
    pub const VIEW_MOUNTAIN: &str = "V006";

    pub const BED_TWIN: &str = "BE001";
    pub const BED_QUEEN: &str = "BE002";
    pub const BED_KING: &str = "BE003";

    pub const INTERIOR_BATHTUB: &str = "IBA001";
    pub const INTERIOR_FLAT_SCREEN_TV: &str = "ITV001";

    pub const SERVICE_SAUNA: &str = "SSA001";
    pub const SERVICE_AIRPORT_SHUTTLE: &str = "SAS001";

    pub const OUTDOOR_PATIO: &str = "OPA001";
    pub const OUTDOOR_BALCONY: &str = "OBA001";

    pub const ROOM_DESIGN_SIZE: &str = "RSI001";
}

/// Immutable lookup tables owned by a [`crate::VerificationEngine`].
///
/// Codes missing from a table score 0, the same as the lowest view level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    view_levels: HashMap<String, u32>,
    bed_points: HashMap<String, u32>,
}

impl Catalog {
    /// Build a catalog from explicit tables.
    pub fn new(view_levels: HashMap<String, u32>, bed_points: HashMap<String, u32>) -> Self {
        Self {
            view_levels,
            bed_points,
        }
    }

    /// The published hotel catalog.
    ///
    /// Views rank mountain < city < garden < pool < river < sea; a king bed is
    /// worth ten queens and a queen ten twins.
    pub fn standard() -> Self {
        let view_levels = [
            (codes::VIEW_MOUNTAIN, 0),
            (codes::VIEW_CITY, 1),
            (codes::VIEW_GARDEN, 2),
            (codes::VIEW_POOL, 3),
            (codes::VIEW_RIVER, 4),
            (codes::VIEW_SEA, 5),
        ];
        let bed_points = [
            (codes::BED_TWIN, 1),
            (codes::BED_QUEEN, 10),
            (codes::BED_KING, 100),
        ];

        Self::new(
            view_levels
                .into_iter()
                .map(|(code, level)| (code.to_string(), level))
                .collect(),
            bed_points
                .into_iter()
                .map(|(code, points)| (code.to_string(), points))
                .collect(),
        )
    }

    /// Ordinal level of a view code.
    pub fn view_level(&self, code: &str) -> u32 {
        self.view_levels.get(code).copied().unwrap_or(0)
    }

    /// Point value of a bed code.
    pub fn bed_points(&self, code: &str) -> u32 {
        self.bed_points.get(code).copied().unwrap_or(0)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
