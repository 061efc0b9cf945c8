//! One scan run: discover leagues, analyze every team, publish the ranking.
//!
//! Calls are issued strictly one after another. Any fetch failure aborts
//! the run without a report, except the request ceiling, which sends a
//! single advisory and ends the run cleanly.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::analysis::streak::analyze;
use crate::api::client::BasketballClient;
use crate::api::errors::ApiError;
use crate::config::ScanTarget;
use crate::data::models::{Game, League, Season, Team};
use crate::notify::telegram::{Notifier, NotifyError};
use crate::report::ranking::{rank, RankOptions, TeamResult};
use crate::report::render::{render_quota_advisory, render_report};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Report delivery failed: {0}")]
    Reporting(#[from] NotifyError),
}

/// Source of league, team and game records.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn leagues(&self, country: &str) -> Result<Vec<League>, ApiError>;

    async fn latest_season(&self, league_id: i64) -> Result<Option<Season>, ApiError>;

    async fn teams(&self, league_id: i64, season: &Season) -> Result<Vec<Team>, ApiError>;

    async fn team_games(
        &self,
        league_id: i64,
        season: &Season,
        team_id: i64,
        last: usize,
        status: Option<&str>,
    ) -> Result<Vec<Game>, ApiError>;
}

#[async_trait]
impl StatsSource for BasketballClient {
    async fn leagues(&self, country: &str) -> Result<Vec<League>, ApiError> {
        self.get_leagues(country).await
    }

    async fn latest_season(&self, league_id: i64) -> Result<Option<Season>, ApiError> {
        self.get_latest_season(league_id).await
    }

    async fn teams(&self, league_id: i64, season: &Season) -> Result<Vec<Team>, ApiError> {
        self.get_teams(league_id, season).await
    }

    async fn team_games(
        &self,
        league_id: i64,
        season: &Season,
        team_id: i64,
        last: usize,
        status: Option<&str>,
    ) -> Result<Vec<Game>, ApiError> {
        self.get_team_games(league_id, season, team_id, last, status)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub targets: Vec<ScanTarget>,
    /// Games examined per team.
    pub window: usize,
    pub games_status: Option<String>,
    pub rank: RankOptions,
}

/// Running totals of a scan.
#[derive(Debug, Default)]
pub struct Tally {
    /// Teams whose games were fetched, usable or not.
    pub teams_scanned: usize,
    /// One entry per team with at least one usable game.
    pub results: Vec<TeamResult>,
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Reported {
        teams_scanned: usize,
        ranked: usize,
    },
    QuotaExhausted {
        used: u32,
        limit: u32,
        teams_scanned: usize,
    },
}

pub struct Scanner<'a, S, N> {
    source: &'a S,
    notifier: &'a N,
    options: ScanOptions,
}

impl<'a, S: StatsSource, N: Notifier> Scanner<'a, S, N> {
    pub fn new(source: &'a S, notifier: &'a N, options: ScanOptions) -> Self {
        Self {
            source,
            notifier,
            options,
        }
    }

    /// Execute one full run and deliver exactly one message.
    pub async fn run(&self) -> Result<RunOutcome, ScanError> {
        let mut tally = Tally::default();

        match self.collect(&mut tally).await {
            Ok(()) => {}
            Err(ApiError::QuotaExceeded { used, limit }) => {
                warn!(used, limit, teams_scanned = tally.teams_scanned, "Request ceiling reached, stopping run");
                let advisory = render_quota_advisory(used, limit, tally.teams_scanned);
                if let Err(e) = self.notifier.send(&advisory).await {
                    error!(error = %e, "Failed to deliver quota advisory");
                }
                return Ok(RunOutcome::QuotaExhausted {
                    used,
                    limit,
                    teams_scanned: tally.teams_scanned,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let ranked = rank(&tally.results, &self.options.rank);
        info!(
            teams_scanned = tally.teams_scanned,
            with_usable_games = tally.results.len(),
            ranked = ranked.len(),
            "Ranking complete"
        );

        let report = render_report(&ranked, self.options.rank.top_n, self.options.window);
        self.notifier.send(&report).await?;

        Ok(RunOutcome::Reported {
            teams_scanned: tally.teams_scanned,
            ranked: ranked.len(),
        })
    }

    /// Walk every target, counting each team whose games were fetched and
    /// keeping a result for those with usable games.
    pub async fn collect(&self, tally: &mut Tally) -> Result<(), ApiError> {
        for target in &self.options.targets {
            let leagues = self.source.leagues(&target.country).await?;
            let selected: Vec<League> = leagues
                .into_iter()
                .filter(|l| target.matches_league(&l.name))
                .collect();

            if selected.is_empty() {
                warn!(country = %target.country, league = ?target.league, "No matching leagues");
                continue;
            }
            info!(country = %target.country, leagues = selected.len(), "Leagues selected");

            for league in &selected {
                self.scan_league(league, tally).await?;
            }
        }
        Ok(())
    }

    async fn scan_league(
        &self,
        league: &League,
        tally: &mut Tally,
    ) -> Result<(), ApiError> {
        let Some(season) = self.source.latest_season(league.id).await? else {
            info!(league_id = league.id, league = %league.name, "No seasons, skipping league");
            return Ok(());
        };

        let teams = self.source.teams(league.id, &season).await?;
        if teams.is_empty() {
            info!(league_id = league.id, season = %season, "No teams, skipping league");
            return Ok(());
        }
        info!(
            league_id = league.id,
            league = %league.name,
            season = %season,
            teams = teams.len(),
            "Scanning league"
        );

        for team in &teams {
            let games = self
                .source
                .team_games(
                    league.id,
                    &season,
                    team.id,
                    self.options.window,
                    self.options.games_status.as_deref(),
                )
                .await?;
            tally.teams_scanned += 1;

            let stats = analyze(&games, self.options.window);
            if stats.usable == 0 {
                debug!(team_id = team.id, team = %team.name, games = games.len(), "No usable games");
                continue;
            }

            debug!(
                team = %team.name,
                streak = stats.streak,
                hits = stats.hits,
                usable = stats.usable,
                "Team analyzed"
            );
            tally.results.push(TeamResult {
                team_id: team.id,
                team: team.name.clone(),
                league: league.name.clone(),
                country: league.country.clone(),
                stats,
            });
        }
        Ok(())
    }
}
