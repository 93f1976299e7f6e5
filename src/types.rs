//! Shared types for the settlement core.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that parser, evaluator, store,
//! and engine modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::predicate::{self, Predicate};

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// The two sides of a wager. The challenger authored the prediction;
/// the accepter took the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Challenger,
    Accepter,
}

impl Party {
    /// The opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Party::Challenger => Party::Accepter,
            Party::Accepter => Party::Challenger,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Challenger => write!(f, "challenger"),
            Party::Accepter => write!(f, "accepter"),
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// A free-text prediction plus its lazily computed structured form.
///
/// Parsing is pure and total, so the cached `Predicate` is computed at
/// most once per record and re-parsing is always a no-op.
#[derive(Debug, Serialize, Deserialize)]
pub struct Prediction {
    text: String,
    #[serde(skip)]
    parsed: OnceLock<Predicate>,
}

impl Prediction {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parsed: OnceLock::new(),
        }
    }

    /// The raw prediction text as the challenger wrote it.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The structured predicate, parsed on first access and cached.
    pub fn predicate(&self) -> &Predicate {
        self.parsed.get_or_init(|| predicate::parse(&self.text))
    }
}

impl Clone for Prediction {
    fn clone(&self) -> Self {
        let parsed = OnceLock::new();
        if let Some(p) = self.parsed.get() {
            let _ = parsed.set(p.clone());
        }
        Self {
            text: self.text.clone(),
            parsed,
        }
    }
}

impl PartialEq for Prediction {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

// ---------------------------------------------------------------------------
// Game result
// ---------------------------------------------------------------------------

/// Authoritative final (or in-progress) score data for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    /// Missing or unparseable score entries default to 0.
    pub home_score: u32,
    pub away_score: u32,
    /// Whether the game has finished. Passed through from the data
    /// source uninterpreted.
    pub completed: bool,
}

impl GameResult {
    /// Name of the winning team, or the literal `"tie"` on equal scores.
    /// No team name contains "tie", so tied games never satisfy a
    /// team-containment check downstream.
    pub fn winner_name(&self) -> &str {
        if self.home_score > self.away_score {
            &self.home_team
        } else if self.away_score > self.home_score {
            &self.away_team
        } else {
            "tie"
        }
    }

    /// Absolute score difference.
    pub fn margin(&self) -> u32 {
        self.home_score.abs_diff(self.away_score)
    }

    /// Combined points scored by both teams.
    pub fn total(&self) -> u32 {
        self.home_score + self.away_score
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} {} ({})",
            self.home_team,
            self.home_score,
            self.away_score,
            self.away_team,
            if self.completed { "final" } else { "in progress" },
        )
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of evaluating a predicate against a game result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The prediction came true — the challenger wins.
    Hit,
    /// The prediction did not come true — the accepter wins.
    Miss,
    /// The game has not completed; no decision yet.
    Pending,
}

impl Outcome {
    /// Whether this outcome is final (settleable).
    pub fn is_final(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }

    /// Boolean form: did the prediction come true? `None` while pending.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Outcome::Hit => Some(true),
            Outcome::Miss => Some(false),
            Outcome::Pending => None,
        }
    }

    /// 0/1 encoding consumed by the on-chain escrow collaborator.
    pub fn as_onchain(&self) -> Option<u8> {
        self.as_bool().map(u8::from)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Hit => write!(f, "hit"),
            Outcome::Miss => write!(f, "miss"),
            Outcome::Pending => write!(f, "pending"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet
// ---------------------------------------------------------------------------

/// Deposit/settlement lifecycle status of a bet.
///
/// Transitions are one-directional: `Created → Funded → Settled`, with
/// `Cancelled` reachable from either non-terminal state. `Settled` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetStatus {
    Created,
    Funded,
    Settled,
    Cancelled,
}

impl BetStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BetStatus::Settled | BetStatus::Cancelled)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Created => write!(f, "created"),
            BetStatus::Funded => write!(f, "funded"),
            BetStatus::Settled => write!(f, "settled"),
            BetStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A peer-to-peer wager between two parties, stakes equal on both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: String,
    /// Challenger wallet address.
    pub challenger: String,
    /// Accepter wallet address.
    pub accepter: String,
    pub prediction: Prediction,
    /// Event id at the odds data source.
    pub game_id: String,
    /// Sport key scoping result lookups, e.g. "basketball_nba".
    pub sport_key: String,
    /// Stake per side. The pot is twice this.
    pub stake_amount: Decimal,
    pub challenger_deposited: bool,
    pub accepter_deposited: bool,
    pub status: BetStatus,
    /// Winner address. Set if and only if the bet is settled.
    pub winner: Option<String>,
    /// Operator-supplied reason, set only on cancellation.
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Bet {
    /// Create a fresh, unfunded bet.
    pub fn new(
        id: impl Into<String>,
        prediction: impl Into<String>,
        challenger: impl Into<String>,
        accepter: impl Into<String>,
        game_id: impl Into<String>,
        sport_key: impl Into<String>,
        stake_amount: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            challenger: challenger.into(),
            accepter: accepter.into(),
            prediction: Prediction::new(prediction),
            game_id: game_id.into(),
            sport_key: sport_key.into(),
            stake_amount,
            challenger_deposited: false,
            accepter_deposited: false,
            status: BetStatus::Created,
            winner: None,
            cancel_reason: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    /// Which side an address belongs to, if any.
    pub fn party_of(&self, address: &str) -> Option<Party> {
        if address == self.challenger {
            Some(Party::Challenger)
        } else if address == self.accepter {
            Some(Party::Accepter)
        } else {
            None
        }
    }

    /// Address of the given party.
    pub fn address_of(&self, party: Party) -> &str {
        match party {
            Party::Challenger => &self.challenger,
            Party::Accepter => &self.accepter,
        }
    }

    /// Whether both stakes have been deposited.
    pub fn is_fully_funded(&self) -> bool {
        self.challenger_deposited && self.accepter_deposited
    }

    /// The full pot paid to the winner: both stakes combined.
    pub fn payout_amount(&self) -> Decimal {
        self.stake_amount * Decimal::from(2)
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] \"{}\" {} vs {} stake={} status={}",
            self.id, self.prediction, self.challenger, self.accepter, self.stake_amount, self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Event emitted to escrow/bot collaborators once a bet settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementEvent {
    pub bet_id: String,
    /// Winner wallet address.
    pub winner: String,
    pub outcome: Outcome,
    /// 2 × stake — the full pot.
    pub payout_amount: Decimal,
    /// True when the predicate could not be evaluated with confidence
    /// (Unknown or proxy-evaluated predicates). Flagged for audit.
    pub low_confidence: bool,
    pub settled_at: DateTime<Utc>,
}

impl fmt::Display for SettlementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bet {} settled: winner={} payout={} outcome={}{}",
            self.bet_id,
            self.winner,
            self.payout_amount,
            self.outcome,
            if self.low_confidence { " (low confidence)" } else { "" },
        )
    }
}

/// Why a settlement attempt was deferred for a later retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferReason {
    /// The data source has no event for this game id (yet).
    GameNotFound,
    /// The data source could not be reached.
    Transport(String),
    /// The game has not completed.
    GameInProgress,
    /// A completed game came back with fewer than two score entries.
    InsufficientScoreData,
}

impl fmt::Display for DeferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferReason::GameNotFound => write!(f, "game not found"),
            DeferReason::Transport(msg) => write!(f, "transport error: {msg}"),
            DeferReason::GameInProgress => write!(f, "game in progress"),
            DeferReason::InsufficientScoreData => write!(f, "insufficient score data"),
        }
    }
}

/// Result of a single settlement attempt.
#[derive(Debug, Clone)]
pub enum SettlementResult {
    /// The bet settled and the payout event was emitted.
    Completed(SettlementEvent),
    /// No state change; the caller should retry later.
    Deferred(DeferReason),
    /// A lifecycle guard rejected the attempt.
    Rejected(BetError),
}

impl SettlementResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, SettlementResult::Completed(_))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, SettlementResult::Deferred(_))
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Lifecycle guard violations. Surfaced immediately and never silently
/// ignored — a missed violation could mean a double payout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BetError {
    #[error("bet not found: {0}")]
    NotFound(String),

    #[error("bet already exists: {0}")]
    AlreadyExists(String),

    #[error("{address} is not a participant in bet {bet_id}")]
    NotAParticipant { bet_id: String, address: String },

    #[error("{party} already deposited for bet {bet_id}")]
    AlreadyDeposited { bet_id: String, party: Party },

    #[error("bet {bet_id} is not funded (status: {status})")]
    NotFunded { bet_id: String, status: BetStatus },

    #[error("bet {0} is already settled")]
    AlreadySettled(String),

    #[error("bet {0} is already cancelled")]
    AlreadyCancelled(String),
}

/// Failures from the game result fetch layer. All variants are
/// retryable: the orchestrator defers and the caller tries again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("game not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    /// A completed game with fewer than two score entries — bad input
    /// for the evaluator rather than a fetch failure.
    #[error("insufficient score data for game {0}")]
    InsufficientScoreData(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
