//! Configuration management.
//!
//! Loads settings from environment variables and .env file.

use std::str::FromStr;
use std::time::Duration;

use crate::api::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::notify::telegram::{TelegramConfig, DEFAULT_API_URL};
use crate::report::ranking::RankOptions;
use crate::scanner::ScanOptions;

/// A country to scan, optionally narrowed to one league name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub country: String,
    pub league: Option<String>,
}

impl ScanTarget {
    /// Case-insensitive name filter; no filter accepts every league.
    pub fn matches_league(&self, name: &str) -> bool {
        match &self.league {
            None => true,
            Some(wanted) => name.trim().eq_ignore_ascii_case(wanted.trim()),
        }
    }
}

impl FromStr for ScanTarget {
    type Err = String;

    /// `Country` or `Country:League Name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (country, league) = match s.split_once(':') {
            Some((c, l)) => (c.trim(), Some(l.trim())),
            None => (s.trim(), None),
        };
        if country.is_empty() {
            return Err(format!("Invalid scan target: {s:?}"));
        }
        Ok(Self {
            country: country.to_string(),
            league: league.filter(|l| !l.is_empty()).map(str::to_string),
        })
    }
}

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // Statistics API
    pub api_key: String,
    pub api_base_url: String,
    pub api_timeout_secs: f64,
    pub api_max_retries: u32,
    pub api_backoff_base_secs: f64,
    pub api_daily_request_limit: u32,
    pub api_rate_limit_per_minute: u32,

    // Telegram
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_api_url: String,
    pub telegram_parse_mode: String,

    // Scan
    pub scan_targets: Vec<String>,
    pub games_window: usize,
    pub games_status: String,
    pub top_n: usize,
    pub min_usable_games: u32,
    pub min_streak: u32,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    /// Load settings from environment variables (and .env file).
    pub fn from_env() -> Self {
        // Try to load .env file (ignore if not found).
        let _ = dotenvy::dotenv();
        let rank = RankOptions::default();

        Self {
            api_key: env_str("API_BASKETBALL_KEY", ""),
            api_base_url: env_str("API_BASE_URL", DEFAULT_BASE_URL),
            api_timeout_secs: env_f64("API_TIMEOUT_SECONDS", 60.0),
            api_max_retries: env_u32("API_MAX_RETRIES", 3),
            api_backoff_base_secs: env_f64("API_BACKOFF_BASE_SECONDS", 1.0),
            api_daily_request_limit: env_u32("API_DAILY_REQUEST_LIMIT", 100),
            api_rate_limit_per_minute: env_u32("API_RATE_LIMIT_PER_MINUTE", 10),

            telegram_bot_token: env_str("TELEGRAM_BOT_TOKEN", ""),
            telegram_chat_id: env_str("TELEGRAM_CHAT_ID", ""),
            telegram_api_url: env_str("TELEGRAM_API_URL", DEFAULT_API_URL),
            telegram_parse_mode: env_str("TELEGRAM_PARSE_MODE", ""),

            scan_targets: env_csv_default("SCAN_TARGETS", "Spain,Turkey,Italy"),
            games_window: env_usize("GAMES_WINDOW", 15),
            games_status: env_str("GAMES_STATUS", ""),
            top_n: env_usize("TOP_N", rank.top_n),
            min_usable_games: env_u32("MIN_USABLE_GAMES", rank.min_usable),
            min_streak: env_u32("MIN_STREAK", rank.min_streak),

            log_level: env_str("LOG_LEVEL", "info"),
            log_json: env_bool("LOG_JSON", false),
        }
    }

    /// Validate configuration for critical requirements.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.api_key.is_empty() {
            errors.push("API_BASKETBALL_KEY is required".to_string());
        }
        if self.telegram_bot_token.is_empty() || self.telegram_chat_id.is_empty() {
            errors.push("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID are required".to_string());
        }
        if self.scan_targets.is_empty() {
            errors.push("SCAN_TARGETS must name at least one country".to_string());
        }
        for raw in &self.scan_targets {
            if let Err(e) = raw.parse::<ScanTarget>() {
                errors.push(e);
            }
        }
        if self.games_window == 0 {
            errors.push("GAMES_WINDOW must be at least 1".to_string());
        }
        if self.top_n == 0 {
            errors.push("TOP_N must be at least 1".to_string());
        }
        if self.api_max_retries == 0 {
            errors.push("API_MAX_RETRIES must be at least 1".to_string());
        }
        if !self.api_timeout_secs.is_finite() || self.api_timeout_secs <= 0.0 {
            errors.push("API_TIMEOUT_SECONDS must be positive".to_string());
        }
        if !self.api_backoff_base_secs.is_finite() || self.api_backoff_base_secs < 0.0 {
            errors.push("API_BACKOFF_BASE_SECONDS must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::try_from_secs_f64(self.api_timeout_secs)
                .unwrap_or(Duration::from_secs(60)),
            max_retries: self.api_max_retries,
            backoff_base: Duration::try_from_secs_f64(self.api_backoff_base_secs)
                .unwrap_or(Duration::from_secs(1)),
            daily_request_limit: self.api_daily_request_limit,
            rate_limit_per_minute: self.api_rate_limit_per_minute,
        }
    }

    pub fn telegram_config(&self) -> TelegramConfig {
        TelegramConfig {
            api_url: self.telegram_api_url.clone(),
            bot_token: self.telegram_bot_token.clone(),
            chat_id: self.telegram_chat_id.clone(),
            parse_mode: Some(self.telegram_parse_mode.clone()).filter(|m| !m.is_empty()),
            timeout: Duration::from_secs(30),
        }
    }

    /// Targets that parse; `validate` reports the ones that don't.
    pub fn targets(&self) -> Vec<ScanTarget> {
        self.scan_targets
            .iter()
            .filter_map(|t| t.parse().ok())
            .collect()
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            targets: self.targets(),
            window: self.games_window,
            games_status: Some(self.games_status.clone()).filter(|s| !s.is_empty()),
            rank: RankOptions {
                top_n: self.top_n,
                min_usable: self.min_usable_games,
                min_streak: self.min_streak,
            },
        }
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_csv_default(key: &str, default: &str) -> Vec<String> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            api_key: "key".to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_timeout_secs: 60.0,
            api_max_retries: 3,
            api_backoff_base_secs: 1.0,
            api_daily_request_limit: 100,
            api_rate_limit_per_minute: 10,
            telegram_bot_token: "token".to_string(),
            telegram_chat_id: "42".to_string(),
            telegram_api_url: DEFAULT_API_URL.to_string(),
            telegram_parse_mode: String::new(),
            scan_targets: vec!["Spain:ACB".to_string(), "Turkey".to_string()],
            games_window: 15,
            games_status: String::new(),
            top_n: 10,
            min_usable_games: 1,
            min_streak: 1,
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    #[test]
    fn test_parse_targets() {
        let t: ScanTarget = "Spain: ACB ".parse().unwrap();
        assert_eq!(t.country, "Spain");
        assert_eq!(t.league.as_deref(), Some("ACB"));
        assert!(t.matches_league("acb"));
        assert!(!t.matches_league("LEB Oro"));

        let any: ScanTarget = "Italy".parse().unwrap();
        assert!(any.league.is_none());
        assert!(any.matches_league("Lega A"));

        let trailing: ScanTarget = "Turkey:".parse().unwrap();
        assert!(trailing.league.is_none());

        assert!(":ACB".parse::<ScanTarget>().is_err());
    }

    #[test]
    fn test_validate_ok() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn test_validate_collects_every_error() {
        let mut s = settings();
        s.api_key.clear();
        s.telegram_chat_id.clear();
        s.games_window = 0;
        let errors = s.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_scan_options_mapping() {
        let mut s = settings();
        s.games_status = "FT".to_string();
        let options = s.scan_options();
        assert_eq!(options.targets.len(), 2);
        assert_eq!(options.window, 15);
        assert_eq!(options.games_status.as_deref(), Some("FT"));
        assert_eq!(options.rank.top_n, 10);

        s.games_status.clear();
        assert!(s.scan_options().games_status.is_none());
    }
}
