//! Bet repository.
//!
//! A small repository seam so the settlement engine can run against an
//! in-memory map in tests and a persistent/chain-backed store in
//! production. `apply` is the one write path: it reads, transitions,
//! and writes back under a single lock acquisition, which makes the
//! `Funded → Settled` step an atomic compare-and-set — concurrent
//! settlers race, exactly one wins, losers observe `AlreadySettled`.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use super::{transition, BetEvent};
use crate::types::{Bet, BetError, BetStatus};

// ---------------------------------------------------------------------------
// Repository trait
// ---------------------------------------------------------------------------

pub trait BetRepository: Send + Sync {
    /// Look up one bet by id.
    fn get(&self, bet_id: &str) -> Result<Bet, BetError>;

    /// Insert a freshly created bet. Duplicate ids are rejected.
    fn put(&self, bet: Bet) -> Result<(), BetError>;

    /// Atomically apply a lifecycle event and return the new state.
    fn apply(&self, bet_id: &str, event: BetEvent<'_>) -> Result<Bet, BetError>;

    /// All bets, unordered.
    fn list(&self) -> Vec<Bet>;

    /// Bets in a given lifecycle state.
    fn list_by_status(&self, status: BetStatus) -> Vec<Bet>;

    // -- Conveniences over `apply` ---------------------------------------

    /// Record a confirmed stake transfer from a participant address.
    fn deposit(&self, bet_id: &str, address: &str) -> Result<Bet, BetError> {
        self.apply(bet_id, BetEvent::Deposit { address })
    }

    /// Settle with a final evaluator outcome (true = challenger wins).
    fn settle(&self, bet_id: &str, challenger_wins: bool) -> Result<Bet, BetError> {
        self.apply(
            bet_id,
            BetEvent::Settle {
                challenger_wins,
                at: Utc::now(),
            },
        )
    }

    /// Cancel a non-terminal bet.
    fn cancel(&self, bet_id: &str, reason: &str) -> Result<Bet, BetError> {
        self.apply(bet_id, BetEvent::Cancel { reason })
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory bet book. The backing map is also the snapshot unit for
/// JSON persistence (`crate::storage`).
#[derive(Default)]
pub struct InMemoryBetStore {
    bets: Mutex<HashMap<String, Bet>>,
}

impl InMemoryBetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted snapshot.
    pub fn from_bets(bets: Vec<Bet>) -> Self {
        let map = bets.into_iter().map(|b| (b.id.clone(), b)).collect();
        Self {
            bets: Mutex::new(map),
        }
    }

    /// Snapshot of the full bet book for persistence.
    pub fn snapshot(&self) -> Vec<Bet> {
        self.bets.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.bets.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BetRepository for InMemoryBetStore {
    fn get(&self, bet_id: &str) -> Result<Bet, BetError> {
        self.bets
            .lock()
            .unwrap()
            .get(bet_id)
            .cloned()
            .ok_or_else(|| BetError::NotFound(bet_id.to_string()))
    }

    fn put(&self, bet: Bet) -> Result<(), BetError> {
        let mut bets = self.bets.lock().unwrap();
        if bets.contains_key(&bet.id) {
            return Err(BetError::AlreadyExists(bet.id));
        }
        info!(bet_id = %bet.id, stake = %bet.stake_amount, "Bet created");
        bets.insert(bet.id.clone(), bet);
        Ok(())
    }

    fn apply(&self, bet_id: &str, event: BetEvent<'_>) -> Result<Bet, BetError> {
        // Read, transition, and write back while holding the lock: this
        // is the atomic compare-and-set the settlement guarantee rests on.
        let mut bets = self.bets.lock().unwrap();
        let current = bets
            .get(bet_id)
            .ok_or_else(|| BetError::NotFound(bet_id.to_string()))?;

        let next = transition(current, event)?;

        if next.status != current.status {
            info!(
                bet_id,
                from = %current.status,
                to = %next.status,
                "Bet status changed"
            );
        }

        bets.insert(bet_id.to_string(), next.clone());
        Ok(next)
    }

    fn list(&self) -> Vec<Bet> {
        self.bets.lock().unwrap().values().cloned().collect()
    }

    fn list_by_status(&self, status: BetStatus) -> Vec<Bet> {
        self.bets
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.status == status)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
