//! Async REST client for API-Basketball.
//!
//! Features:
//! - `x-apisports-key` authentication
//! - Per-client request budget checked before every attempt
//! - Client-side pacing (configurable, default 10 req/min)
//! - Bounded retries with linear backoff
//! - Body-level error inspection on every response, whatever the status

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

use crate::data::models::{Envelope, Game, League, LeagueEntry, Season, Team};

use super::budget::RequestBudget;
use super::errors::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://v1.basketball.api-sports.io";

/// Client tuning, normally built from `Settings`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub daily_request_limit: u32,
    pub rate_limit_per_minute: u32,
}

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum Attempt {
    Success(Vec<serde_json::Value>),
    Retry(ApiError),
    Fail(ApiError),
}

/// Decide what a response means for the retry loop.
///
/// The body's `errors` field is checked first: API-Sports reports most
/// failures inside an HTTP 200. A body error is never retried.
pub fn classify(status: u16, body: &str, budget: &RequestBudget) -> Attempt {
    let envelope = serde_json::from_str::<Envelope>(body);

    if let Ok(env) = &envelope {
        if env.has_errors() {
            return Attempt::Fail(ApiError::from_body_errors(
                &env.errors,
                budget.used(),
                budget.limit(),
            ));
        }
    }

    if status == 401 || status == 403 {
        return Attempt::Fail(ApiError::Authentication(format!("HTTP {status}")));
    }

    if status == 429 {
        return Attempt::Retry(ApiError::RateLimited(format!("HTTP {status}")));
    }

    if !(200..300).contains(&status) {
        let message: String = body.chars().take(200).collect();
        return Attempt::Retry(ApiError::Http {
            status_code: status,
            message,
        });
    }

    match envelope {
        Ok(env) => match env.into_records() {
            Some(records) => Attempt::Success(records),
            None => Attempt::Retry(ApiError::Deserialization(
                "`response` is not an array".to_string(),
            )),
        },
        Err(e) => Attempt::Retry(ApiError::Deserialization(e.to_string())),
    }
}

/// Linear backoff: `base * (1 + attempt)`, attempt counted from zero.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt.saturating_add(1))
}

/// Async REST client for API-Basketball.
pub struct BasketballClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: DefaultDirectRateLimiter,
    budget: RequestBudget,
    max_retries: u32,
    backoff_base: Duration,
}

impl BasketballClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        if config.api_key.trim().is_empty() {
            return Err(ApiError::Authentication(
                "API_BASKETBALL_KEY is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let per_minute = NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        Ok(Self {
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            rate_limiter,
            budget: RequestBudget::new(config.daily_request_limit),
            max_retries: config.max_retries.max(1),
            backoff_base: config.backoff_base,
        })
    }

    pub fn budget(&self) -> &RequestBudget {
        &self.budget
    }

    // =========================================================================
    // Core request method
    // =========================================================================

    /// Fetch the `response` array of one resource.
    pub async fn fetch(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        let url = format!("{}/{}", self.base_url, resource.trim_start_matches('/'));
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..self.max_retries {
            let request_no = self.budget.acquire()?;
            self.rate_limiter.until_ready().await;

            debug!(
                resource,
                params = ?params,
                attempt = attempt + 1,
                request_no,
                "API request"
            );

            let outcome = match self
                .client
                .get(&url)
                .header("x-apisports-key", &self.api_key)
                .query(params)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status().as_u16();
                    match response.text().await {
                        Ok(body) => classify(status, &body, &self.budget),
                        Err(e) => Attempt::Retry(ApiError::Network(e.to_string())),
                    }
                }
                Err(e) if e.is_timeout() => Attempt::Retry(ApiError::Timeout(e.to_string())),
                Err(e) => Attempt::Retry(ApiError::Network(e.to_string())),
            };

            match outcome {
                Attempt::Success(records) => {
                    debug!(resource, records = records.len(), "API response");
                    return Ok(records);
                }
                Attempt::Fail(e) => {
                    warn!(resource, error = %e, "API request failed");
                    return Err(e);
                }
                Attempt::Retry(e) => {
                    let is_last = attempt + 1 >= self.max_retries;
                    let delay = backoff_delay(self.backoff_base, attempt);
                    warn!(
                        resource,
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = if is_last { 0 } else { delay.as_millis() as u64 },
                        "Transient API error"
                    );
                    last_error = Some(e);
                    if !is_last {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(ApiError::MaxRetriesExceeded {
            attempts: self.max_retries,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    // =========================================================================
    // Resource endpoints
    // =========================================================================

    /// Leagues (not cups) of one country.
    pub async fn get_leagues(&self, country: &str) -> Result<Vec<League>, ApiError> {
        let params = [("country", country.to_string()), ("type", "league".to_string())];
        let records = self.fetch("leagues", &params).await?;

        Ok(records
            .into_iter()
            .filter_map(|r| serde_json::from_value::<LeagueEntry>(r).ok())
            .filter_map(|entry| League::from_entry(entry, country))
            .collect())
    }

    /// Most recent season a league has data for.
    pub async fn get_latest_season(&self, league_id: i64) -> Result<Option<Season>, ApiError> {
        let params = [("league", league_id.to_string())];
        let records = self.fetch("seasons", &params).await?;
        Ok(Season::latest(&records))
    }

    pub async fn get_teams(&self, league_id: i64, season: &Season) -> Result<Vec<Team>, ApiError> {
        let params = [
            ("league", league_id.to_string()),
            ("season", season.label.clone()),
        ];
        let records = self.fetch("teams", &params).await?;
        Ok(records.iter().filter_map(Team::from_value).collect())
    }

    /// A team's last `last` games, limited server-side to save quota.
    pub async fn get_team_games(
        &self,
        league_id: i64,
        season: &Season,
        team_id: i64,
        last: usize,
        status: Option<&str>,
    ) -> Result<Vec<Game>, ApiError> {
        let mut params = vec![
            ("league", league_id.to_string()),
            ("season", season.label.clone()),
            ("team", team_id.to_string()),
            ("last", last.to_string()),
        ];
        if let Some(s) = status {
            params.push(("status", s.to_string()));
        }

        let records = self.fetch("games", &params).await?;

        // Parse each game individually; skip any that fail deserialization.
        Ok(records
            .into_iter()
            .filter_map(|g| match serde_json::from_value::<Game>(g) {
                Ok(game) => Some(game),
                Err(e) => {
                    debug!(error = %e, team_id, "Skipping unparseable game");
                    None
                }
            })
            .collect())
    }
}
