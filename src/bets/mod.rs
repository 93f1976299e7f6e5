//! Bet lifecycle state machine.
//!
//! Transitions are pure functions over an immutable snapshot: apply an
//! event to a bet and get back either the next state or a guard error.
//! The store (`store.rs`) is responsible for applying them atomically.

pub mod store;

use chrono::{DateTime, Utc};

use crate::types::{Bet, BetError, BetStatus, Party};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Lifecycle events issued by collaborators.
#[derive(Debug, Clone, Copy)]
pub enum BetEvent<'a> {
    /// A confirmed stake transfer from one participant's address.
    Deposit { address: &'a str },
    /// A final evaluator outcome: true means the challenger's
    /// prediction hit.
    Settle {
        challenger_wins: bool,
        at: DateTime<Utc>,
    },
    /// Explicit lifecycle cancellation (not an I/O abort).
    Cancel { reason: &'a str },
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

/// Apply an event to a bet, producing the next state.
///
/// Terminal states reject every event. Guard violations come back as
/// `BetError` and leave the input untouched.
pub fn transition(bet: &Bet, event: BetEvent<'_>) -> Result<Bet, BetError> {
    match event {
        BetEvent::Deposit { address } => deposit(bet, address),
        BetEvent::Settle { challenger_wins, at } => settle(bet, challenger_wins, at),
        BetEvent::Cancel { reason } => cancel(bet, reason),
    }
}

fn guard_not_terminal(bet: &Bet) -> Result<(), BetError> {
    match bet.status {
        BetStatus::Settled => Err(BetError::AlreadySettled(bet.id.clone())),
        BetStatus::Cancelled => Err(BetError::AlreadyCancelled(bet.id.clone())),
        _ => Ok(()),
    }
}

fn deposit(bet: &Bet, address: &str) -> Result<Bet, BetError> {
    guard_not_terminal(bet)?;

    let party = bet.party_of(address).ok_or_else(|| BetError::NotAParticipant {
        bet_id: bet.id.clone(),
        address: address.to_string(),
    })?;

    let mut next = bet.clone();
    let flag = match party {
        Party::Challenger => &mut next.challenger_deposited,
        Party::Accepter => &mut next.accepter_deposited,
    };
    if *flag {
        return Err(BetError::AlreadyDeposited {
            bet_id: bet.id.clone(),
            party,
        });
    }
    *flag = true;

    if next.is_fully_funded() {
        next.status = BetStatus::Funded;
    }
    Ok(next)
}

fn settle(bet: &Bet, challenger_wins: bool, at: DateTime<Utc>) -> Result<Bet, BetError> {
    match bet.status {
        BetStatus::Funded => {}
        BetStatus::Settled => return Err(BetError::AlreadySettled(bet.id.clone())),
        status => {
            return Err(BetError::NotFunded {
                bet_id: bet.id.clone(),
                status,
            })
        }
    }

    let mut next = bet.clone();
    next.winner = Some(
        if challenger_wins {
            &next.challenger
        } else {
            &next.accepter
        }
        .clone(),
    );
    next.status = BetStatus::Settled;
    next.settled_at = Some(at);
    Ok(next)
}

fn cancel(bet: &Bet, reason: &str) -> Result<Bet, BetError> {
    guard_not_terminal(bet)?;

    let mut next = bet.clone();
    next.status = BetStatus::Cancelled;
    next.cancel_reason = Some(reason.to_string());
    Ok(next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
