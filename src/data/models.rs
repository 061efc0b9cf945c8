//! Data models for API-Basketball responses.
//!
//! Only the fields the scanner reads are modelled. Every field that the
//! API is known to null out (quarter scores of unplayed games, season
//! labels, dates) is optional so a single odd record never fails a whole
//! response.

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Envelope
// =============================================================================

/// Standard API-Sports response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub errors: serde_json::Value,
    #[serde(default)]
    pub response: serde_json::Value,
}

impl Envelope {
    /// `errors` is empty when absent, null, `[]` or `{}`.
    pub fn has_errors(&self) -> bool {
        match &self.errors {
            serde_json::Value::Null => false,
            serde_json::Value::Array(a) => !a.is_empty(),
            serde_json::Value::Object(o) => !o.is_empty(),
            serde_json::Value::String(s) => !s.is_empty(),
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(_) => true,
        }
    }

    /// Records in `response`. A missing or null `response` is an empty list.
    pub fn into_records(self) -> Option<Vec<serde_json::Value>> {
        match self.response {
            serde_json::Value::Array(items) => Some(items),
            serde_json::Value::Null => Some(Vec::new()),
            _ => None,
        }
    }
}

// =============================================================================
// Leagues
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueEntry {
    #[serde(default)]
    pub league: Option<LeagueInfo>,
    #[serde(default)]
    pub country: Option<CountryInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryInfo {
    #[serde(default)]
    pub name: Option<String>,
}

/// A league selected for scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub country: String,
}

impl League {
    /// Build from a raw `/leagues` entry; entries without id or name are dropped.
    pub fn from_entry(entry: LeagueEntry, fallback_country: &str) -> Option<Self> {
        let info = entry.league?;
        let name = info.name.filter(|n| !n.trim().is_empty())?;
        let country = entry
            .country
            .and_then(|c| c.name)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| fallback_country.to_string());
        Some(Self {
            id: info.id?,
            name,
            country,
        })
    }
}

// =============================================================================
// Seasons
// =============================================================================

/// A season identifier as returned by `/seasons`.
///
/// The API mixes integers (`2023`), numeric strings (`"2023"`) and spans
/// (`"2023-2024"`). The raw label is sent back verbatim as the `season`
/// query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Season {
    pub label: String,
    pub start_year: i32,
}

impl Season {
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        let label = match value {
            serde_json::Value::Number(n) => n.as_i64()?.to_string(),
            serde_json::Value::String(s) => s.trim().to_string(),
            _ => return None,
        };
        let start_year = label
            .split(['-', '/'])
            .next()
            .and_then(|y| y.trim().parse::<i32>().ok())?;
        Some(Self { label, start_year })
    }

    /// Most recent season in a `/seasons` response, if any parse.
    pub fn latest(values: &[serde_json::Value]) -> Option<Self> {
        values.iter().filter_map(Self::parse).max()
    }
}

impl Ord for Season {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_year
            .cmp(&other.start_year)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for Season {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// =============================================================================
// Teams
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TeamEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

impl Team {
    /// `/teams` returns either bare team objects or `{ "team": {...} }` wrappers.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let inner = value.get("team").unwrap_or(value);
        let entry: TeamEntry = serde_json::from_value(inner.clone()).ok()?;
        let name = entry.name.filter(|n| !n.trim().is_empty())?;
        Some(Self {
            id: entry.id?,
            name,
        })
    }
}

// =============================================================================
// Games
// =============================================================================

/// Deserialize a field leniently: a value of the wrong type becomes `None`.
///
/// Quarter scores occasionally arrive as strings (`"n/a"`), negatives or
/// floats. The game must still be kept so it reads as unknown rather
/// than disappearing from the sequence.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuarterLine {
    #[serde(default, deserialize_with = "lenient")]
    pub quarter_1: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub quarter_2: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GameScores {
    #[serde(default, deserialize_with = "lenient")]
    pub home: Option<QuarterLine>,
    #[serde(default, deserialize_with = "lenient")]
    pub away: Option<QuarterLine>,
}

/// One game from `/games`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Game {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub scores: Option<GameScores>,
}

impl Game {
    /// Parsed kickoff time. `None` when absent or not RFC 3339.
    pub fn kickoff(&self) -> Option<DateTime<FixedOffset>> {
        self.date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
    }

    fn line(&self, home: bool) -> Option<&QuarterLine> {
        let scores = self.scores.as_ref()?;
        if home {
            scores.home.as_ref()
        } else {
            scores.away.as_ref()
        }
    }

    pub fn home_quarter(&self, quarter: u8) -> Option<u32> {
        self.line(true).and_then(|l| l.quarter(quarter))
    }

    pub fn away_quarter(&self, quarter: u8) -> Option<u32> {
        self.line(false).and_then(|l| l.quarter(quarter))
    }
}

impl QuarterLine {
    pub fn quarter(&self, quarter: u8) -> Option<u32> {
        match quarter {
            1 => self.quarter_1,
            2 => self.quarter_2,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_error_detection() {
        let empty_list: Envelope = serde_json::from_value(json!({"errors": [], "response": []})).unwrap();
        assert!(!empty_list.has_errors());

        let empty_obj: Envelope = serde_json::from_value(json!({"errors": {}, "response": []})).unwrap();
        assert!(!empty_obj.has_errors());

        let missing: Envelope = serde_json::from_value(json!({"response": [1]})).unwrap();
        assert!(!missing.has_errors());
        assert_eq!(missing.into_records().unwrap().len(), 1);

        let failed: Envelope =
            serde_json::from_value(json!({"errors": {"token": "bad"}, "response": []})).unwrap();
        assert!(failed.has_errors());
    }

    #[test]
    fn test_envelope_rejects_non_array_response() {
        let odd: Envelope = serde_json::from_value(json!({"errors": [], "response": "nope"})).unwrap();
        assert!(odd.into_records().is_none());
    }

    #[test]
    fn test_season_parsing() {
        assert_eq!(Season::parse(&json!(2023)).unwrap().start_year, 2023);
        assert_eq!(Season::parse(&json!("2022")).unwrap().start_year, 2022);
        let span = Season::parse(&json!("2023-2024")).unwrap();
        assert_eq!(span.start_year, 2023);
        assert_eq!(span.label, "2023-2024");
        assert!(Season::parse(&json!("current")).is_none());
        assert!(Season::parse(&json!(null)).is_none());
    }

    #[test]
    fn test_latest_season_mixed_formats() {
        let values = vec![json!(2021), json!("2022"), json!("2023-2024"), json!("junk")];
        let latest = Season::latest(&values).unwrap();
        assert_eq!(latest.label, "2023-2024");

        assert!(Season::latest(&[]).is_none());
        assert!(Season::latest(&[json!("junk")]).is_none());
    }

    #[test]
    fn test_league_from_entry() {
        let entry: LeagueEntry = serde_json::from_value(json!({
            "league": {"id": 117, "name": "ACB"},
            "country": {"name": "Spain"}
        }))
        .unwrap();
        let league = League::from_entry(entry, "fallback").unwrap();
        assert_eq!(league.id, 117);
        assert_eq!(league.country, "Spain");

        let nameless: LeagueEntry = serde_json::from_value(json!({"league": {"id": 5}})).unwrap();
        assert!(League::from_entry(nameless, "Spain").is_none());
    }

    #[test]
    fn test_team_from_wrapped_and_bare() {
        let bare = Team::from_value(&json!({"id": 1, "name": "Real Madrid"})).unwrap();
        assert_eq!(bare.name, "Real Madrid");
        let wrapped = Team::from_value(&json!({"team": {"id": 2, "name": "Barcelona"}})).unwrap();
        assert_eq!(wrapped.id, 2);
        assert!(Team::from_value(&json!({"id": 3})).is_none());
    }

    #[test]
    fn test_game_quarters_keep_zero_and_null_apart() {
        let game: Game = serde_json::from_value(json!({
            "id": 10,
            "date": "2024-03-01T19:00:00+00:00",
            "scores": {
                "home": {"quarter_1": 0, "quarter_2": 21},
                "away": {"quarter_1": null, "quarter_2": 18}
            }
        }))
        .unwrap();
        assert_eq!(game.home_quarter(1), Some(0));
        assert_eq!(game.away_quarter(1), None);
        assert_eq!(game.away_quarter(2), Some(18));
        assert!(game.kickoff().is_some());
    }

    #[test]
    fn test_malformed_quarter_scores_read_as_missing() {
        let game: Game = serde_json::from_value(json!({
            "id": 11,
            "date": "2024-03-02T19:00:00+00:00",
            "scores": {
                "home": {"quarter_1": "n/a", "quarter_2": -3},
                "away": {"quarter_1": 17.5, "quarter_2": 20}
            }
        }))
        .unwrap();
        assert_eq!(game.home_quarter(1), None);
        assert_eq!(game.home_quarter(2), None);
        assert_eq!(game.away_quarter(1), None);
        assert_eq!(game.away_quarter(2), Some(20));
    }

    #[test]
    fn test_malformed_blocks_keep_the_game() {
        let game: Game = serde_json::from_value(json!({
            "id": "x",
            "date": 20240302,
            "scores": {"home": "tbd", "away": null}
        }))
        .unwrap();
        assert!(game.id.is_none());
        assert!(game.kickoff().is_none());
        assert_eq!(game.home_quarter(1), None);
    }
}
