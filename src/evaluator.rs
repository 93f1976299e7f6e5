//! Outcome evaluation.
//!
//! Applies a structured predicate to a fetched game result. Pure and
//! deterministic: identical inputs always produce identical outcomes.

use tracing::{debug, warn};

use crate::predicate::{Direction, Predicate};
use crate::types::{GameResult, Outcome};

/// Evaluate a predicate against a game result.
///
/// Incomplete games are always `Pending`. Tied games never satisfy a
/// team predicate (no team name contains the literal "tie"). Over/under
/// uses strict inequality, so a push evaluates to a miss in both
/// directions. `Unknown` predicates deterministically miss and are
/// WARN-logged so operators can audit low-confidence settlements.
pub fn evaluate(predicate: &Predicate, result: &GameResult) -> Outcome {
    if !result.completed {
        return Outcome::Pending;
    }

    let winner = result.winner_name();
    let outcome = match predicate {
        Predicate::Moneyline { team } => hit_if(team_won(winner, team)),

        // No play-by-play data exists, so first-to-score routes through
        // the same winner-containment proxy as a moneyline.
        Predicate::FirstToScore { team } => hit_if(team_won(winner, team)),

        Predicate::Margin { team, min_margin } => {
            hit_if(team_won(winner, team) && result.margin() >= *min_margin)
        }

        Predicate::OverUnder { direction, threshold } => {
            let total = f64::from(result.total());
            hit_if(match direction {
                Direction::Over => total > *threshold,
                Direction::Under => total < *threshold,
            })
        }

        Predicate::ExactScore { home, away } => {
            hit_if(result.home_score == *home && result.away_score == *away)
        }

        Predicate::Unknown => {
            warn!(
                game_id = %result.game_id,
                "Unevaluable prediction settled as a miss"
            );
            Outcome::Miss
        }
    };

    debug!(
        predicate = %predicate,
        winner = winner,
        margin = result.margin(),
        total = result.total(),
        outcome = %outcome,
        "Predicate evaluated"
    );

    outcome
}

/// Case-insensitive winner-contains-team check.
fn team_won(winner: &str, team: &str) -> bool {
    winner.to_lowercase().contains(&team.to_lowercase())
}

fn hit_if(condition: bool) -> Outcome {
    if condition {
        Outcome::Hit
    } else {
        Outcome::Miss
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
