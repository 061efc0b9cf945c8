//! Per-game observation of the quarter scoring condition.
//!
//! The condition holds when the combined first-quarter points are
//! strictly lower than the combined second-quarter points.

use serde::Serialize;

use crate::data::models::Game;

/// Tri-state result of evaluating one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Observation {
    Hit,
    Miss,
    /// At least one of the four required quarter scores is absent.
    Unknown,
}

impl Observation {
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn from_totals(first_quarter: u64, second_quarter: u64) -> Self {
        if first_quarter < second_quarter {
            Self::Hit
        } else {
            Self::Miss
        }
    }
}

/// Evaluate one game. A score of zero is data; only a missing score is unknown.
pub fn extract(game: &Game) -> Observation {
    let quarters = (
        game.home_quarter(1),
        game.away_quarter(1),
        game.home_quarter(2),
        game.away_quarter(2),
    );
    match quarters {
        (Some(h1), Some(a1), Some(h2), Some(a2)) => Observation::from_totals(
            u64::from(h1) + u64::from(a1),
            u64::from(h2) + u64::from(a2),
        ),
        _ => Observation::Unknown,
    }
}
