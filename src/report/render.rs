//! Plain-text rendering of the ranking and the quota advisory.

use std::fmt::Write;

use super::ranking::TeamResult;

pub const CONDITION_LABEL: &str = "total 1q < 2q";

/// Render the top-N report. An empty ranking renders the no-data message.
pub fn render_report(ranked: &[TeamResult], top_n: usize, window: usize) -> String {
    if ranked.is_empty() {
        return format!("No teams with an active streak today for condition: {CONDITION_LABEL}");
    }

    let mut msg = format!("🏀 TOP-{top_n} active streak ({CONDITION_LABEL})\n\n");
    for (i, row) in ranked.iter().enumerate() {
        let _ = writeln!(
            msg,
            "{}) streak={} | freq={}/{} ({}) | {} | {}",
            i + 1,
            row.stats.streak,
            row.stats.hits,
            row.stats.usable,
            window,
            row.team,
            row.league_label(),
        );
    }
    msg
}

/// Advisory sent instead of the report when the request ceiling stops a run.
pub fn render_quota_advisory(used: u32, limit: u32, teams_scanned: usize) -> String {
    format!(
        "⚠️ API request limit reached ({used}/{limit}). \
         Run stopped after {teams_scanned} teams; no ranking was produced."
    )
}
