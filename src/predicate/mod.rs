//! Free-text prediction parsing.
//!
//! `parse` converts a challenger's free-text prediction into a tagged,
//! evaluable `Predicate`. Parsing is pure and total: it never errors,
//! and anything the matchers cannot classify degrades to
//! `Predicate::Unknown` (which downstream deterministically loses).

pub mod matchers;
pub mod teams;

use serde::{Deserialize, Serialize};
use std::fmt;

use matchers::MATCHERS;

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Over/under direction for a total-points predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Over,
    Under,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Over => write!(f, "over"),
            Direction::Under => write!(f, "under"),
        }
    }
}

/// Structured, evaluable form of a free-text prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// The named team simply wins.
    Moneyline { team: String },
    /// The named team wins by at least `min_margin` points.
    Margin { team: String, min_margin: u32 },
    /// Combined points strictly over/under the threshold.
    OverUnder { direction: Direction, threshold: f64 },
    /// Exact final score, home-away order sensitive.
    ExactScore { home: u32, away: u32 },
    /// Kept as a distinct variant so it stays observable, but there is
    /// no play-by-play data: the evaluator falls back to a winner proxy.
    FirstToScore { team: String },
    /// Nothing matched. Evaluates to a deterministic miss.
    Unknown,
}

impl Predicate {
    /// Whether a settlement derived from this predicate should be
    /// flagged for operator audit.
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, Predicate::Unknown | Predicate::FirstToScore { .. })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Moneyline { team } => write!(f, "moneyline({team})"),
            Predicate::Margin { team, min_margin } => write!(f, "margin({team} by {min_margin}+)"),
            Predicate::OverUnder { direction, threshold } => {
                write!(f, "total {direction} {threshold}")
            }
            Predicate::ExactScore { home, away } => write!(f, "exact score {home}-{away}"),
            Predicate::FirstToScore { team } => write!(f, "first to score({team})"),
            Predicate::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser entry point
// ---------------------------------------------------------------------------

/// Parse free text into a `Predicate`.
///
/// Matchers run in fixed priority order; the first match wins. Input is
/// lowercased once up front so matchers and the alias tables can assume
/// normalized text.
pub fn parse(text: &str) -> Predicate {
    let normalized = text.to_lowercase();

    for matcher in MATCHERS {
        if let Some(predicate) = matcher.try_parse(&normalized) {
            tracing::debug!(
                matcher = matcher.name(),
                predicate = %predicate,
                "Prediction parsed"
            );
            return predicate;
        }
    }

    tracing::debug!(text = %text, "Prediction did not match any pattern");
    Predicate::Unknown
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
