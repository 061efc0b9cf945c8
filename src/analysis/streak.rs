//! Active streak and hit frequency over a team's most recent games.
//!
//! Two independent passes run over the same window:
//! - frequency counts every usable game and skips unknowns;
//! - streak walks from the most recent game and stops at the first
//!   miss or unknown, since a gap leaves the prefix undetermined.

use serde::Serialize;
use std::cmp::Ordering;

use super::observation::{extract, Observation};
use crate::data::models::Game;

/// Streak/frequency statistic for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakStats {
    pub streak: u32,
    pub hits: u32,
    pub usable: u32,
}

impl StreakStats {
    /// Exact comparison of hit ratios without going through floats.
    pub fn cmp_frequency(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.hits) * u64::from(other.usable.max(1));
        let rhs = u64::from(other.hits) * u64::from(self.usable.max(1));
        lhs.cmp(&rhs)
    }
}

/// Sort most recent first. Undated games go last; ties keep fetch order.
pub fn sort_most_recent_first(games: &mut [Game]) {
    games.sort_by(|a, b| match (a.kickoff(), b.kickoff()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Streak over observations already ordered most recent first.
pub fn active_streak(observations: &[Observation]) -> u32 {
    observations
        .iter()
        .take_while(|o| **o == Observation::Hit)
        .count() as u32
}

/// Hits and usable count, ignoring unknowns.
pub fn frequency(observations: &[Observation]) -> (u32, u32) {
    observations
        .iter()
        .filter(|o| o.is_usable())
        .fold((0, 0), |(hits, usable), o| {
            (hits + u32::from(*o == Observation::Hit), usable + 1)
        })
}

/// Analyze a team's games, keeping at most `window` most recent ones.
pub fn analyze(games: &[Game], window: usize) -> StreakStats {
    let mut ordered = games.to_vec();
    sort_most_recent_first(&mut ordered);
    ordered.truncate(window);

    let observations: Vec<Observation> = ordered.iter().map(extract).collect();
    analyze_observations(&observations)
}

/// Both passes over a pre-ordered, pre-windowed observation sequence.
pub fn analyze_observations(observations: &[Observation]) -> StreakStats {
    let (hits, usable) = frequency(observations);
    StreakStats {
        streak: active_streak(observations),
        hits,
        usable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Observation::{Hit, Miss, Unknown};

    #[test]
    fn test_streak_stops_on_miss() {
        let stats = analyze_observations(&[Hit, Hit, Miss, Hit]);
        assert_eq!(stats, StreakStats { streak: 2, hits: 3, usable: 4 });
    }

    #[test]
    fn test_unknown_stops_streak_but_not_frequency() {
        let stats = analyze_observations(&[Unknown, Hit, Hit]);
        assert_eq!(stats, StreakStats { streak: 0, hits: 2, usable: 2 });

        let stats = analyze_observations(&[Hit, Unknown, Hit, Miss]);
        assert_eq!(stats, StreakStats { streak: 1, hits: 2, usable: 3 });
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(analyze_observations(&[]), StreakStats::default());
    }

    #[test]
    fn test_frequency_ratio_comparison() {
        let two_of_three = StreakStats { streak: 0, hits: 2, usable: 3 };
        let three_of_five = StreakStats { streak: 0, hits: 3, usable: 5 };
        let four_of_six = StreakStats { streak: 0, hits: 4, usable: 6 };
        assert_eq!(two_of_three.cmp_frequency(&three_of_five), Ordering::Greater);
        assert_eq!(two_of_three.cmp_frequency(&four_of_six), Ordering::Equal);
    }
}
