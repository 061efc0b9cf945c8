//! Cross-league ranking of team streak results.

use serde::Serialize;
use std::cmp::Ordering;

use crate::analysis::streak::StreakStats;

/// Per-team aggregate produced once per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResult {
    pub team_id: i64,
    pub team: String,
    pub league: String,
    pub country: String,
    pub stats: StreakStats,
}

impl TeamResult {
    pub fn league_label(&self) -> String {
        format!("{}: {}", self.country, self.league)
    }
}

/// Eligibility and size limits for the ranking.
#[derive(Debug, Clone)]
pub struct RankOptions {
    pub top_n: usize,
    pub min_usable: u32,
    pub min_streak: u32,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_usable: 1,
            min_streak: 1,
        }
    }
}

/// Descending order on (streak, frequency, usable).
pub fn compare(a: &TeamResult, b: &TeamResult) -> Ordering {
    b.stats
        .streak
        .cmp(&a.stats.streak)
        .then_with(|| b.stats.cmp_frequency(&a.stats))
        .then_with(|| b.stats.usable.cmp(&a.stats.usable))
}

/// Filter, order and truncate. Equal keys keep their input order.
pub fn rank(results: &[TeamResult], options: &RankOptions) -> Vec<TeamResult> {
    // A team with no usable games never qualifies, whatever the threshold.
    let min_usable = options.min_usable.max(1);

    let mut ranked: Vec<TeamResult> = results
        .iter()
        .filter(|r| r.stats.usable >= min_usable && r.stats.streak >= options.min_streak)
        .cloned()
        .collect();

    ranked.sort_by(compare);
    ranked.truncate(options.top_n);
    ranked
}
