//! The Odds API score client.
//!
//! Fetches final/partial scores from the free scores endpoint:
//! `GET /v4/sports/{sport_key}/scores?eventIds=...&daysFrom=...`
//!
//! API: `https://api.the-odds-api.com/v4/`
//! Auth: `apiKey` query parameter.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::GameResultSource;
use crate::types::{FetchError, GameResult};

const BASE_URL: &str = "https://api.the-odds-api.com/v4";

// ---------------------------------------------------------------------------
// API response types (The Odds API JSON → Rust)
// ---------------------------------------------------------------------------

/// One event from the scores endpoint. We only deserialize the fields
/// we need.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoresEvent {
    id: String,
    #[serde(default)]
    completed: bool,
    home_team: String,
    away_team: String,
    /// Absent while a game has not started.
    #[serde(default)]
    scores: Option<Vec<ScoreEntry>>,
}

/// Scores come back as strings keyed by team name.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoreEntry {
    name: String,
    #[serde(default)]
    score: Option<String>,
}

/// Map a wire event into a `GameResult`.
///
/// Score entries are matched to home/away by exact team-name equality;
/// a missing or unparseable score for a named team defaults to 0. A
/// completed event with fewer than two score entries is bad evaluator
/// input, surfaced as `InsufficientScoreData` so the caller can retry
/// or escalate.
pub(crate) fn map_event(event: ScoresEvent) -> Result<GameResult, FetchError> {
    let entries = event.scores.unwrap_or_default();

    if event.completed && entries.len() < 2 {
        return Err(FetchError::InsufficientScoreData(event.id));
    }

    let mut home_score = 0;
    let mut away_score = 0;
    for entry in &entries {
        let score = entry
            .score
            .as_deref()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        if entry.name == event.home_team {
            home_score = score;
        } else if entry.name == event.away_team {
            away_score = score;
        }
    }

    Ok(GameResult {
        game_id: event.id,
        home_team: event.home_team,
        away_team: event.away_team,
        home_score,
        away_score,
        completed: event.completed,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The Odds API client.
pub struct OddsApiClient {
    http: Client,
    api_key: String,
}

impl OddsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent("sendbet/0.1.0")
            .build()
            .context("Failed to build HTTP client for The Odds API")?;
        Ok(Self { http, api_key })
    }
}

#[async_trait]
impl GameResultSource for OddsApiClient {
    async fn fetch(
        &self,
        game_id: &str,
        sport_key: &str,
        lookback_days: u32,
    ) -> Result<GameResult, FetchError> {
        let url = format!(
            "{BASE_URL}/sports/{}/scores?apiKey={}&eventIds={}&daysFrom={}",
            urlencoding::encode(sport_key),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(game_id),
            lookback_days,
        );

        debug!(game_id, sport_key, lookback_days, "Fetching game scores");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Transport(format!(
                "scores endpoint returned HTTP {}",
                resp.status()
            )));
        }

        let events: Vec<ScoresEvent> = resp
            .json()
            .await
            .map_err(|e| FetchError::Transport(format!("invalid scores payload: {e}")))?;

        let event = events
            .into_iter()
            .find(|e| e.id == game_id)
            .ok_or_else(|| FetchError::NotFound(game_id.to_string()))?;

        map_event(event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
