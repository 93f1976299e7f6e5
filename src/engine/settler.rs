use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::bets::store::BetRepository;
use crate::results::GameResultSource;
use crate::types::{
    Bet, BetError, BetStatus, DeferReason, FetchError, Outcome, SettlementEvent, SettlementResult,
};

/// Attempts per bet before giving up until the next tick.
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;

const RETRY_BASE_DELAY_MS: u64 = 500;

// ---------------------------------------------------------------------------
// Settlement sinks
// ---------------------------------------------------------------------------

/// Receives settlement events once a bet reaches its terminal state.
/// Escrow release, notifications, and audit trails all hang off this.
pub trait SettlementSink: Send + Sync {
    fn on_settled(&self, event: &SettlementEvent);
}

/// Default sink: structured log line per settlement.
pub struct LogSink;

impl SettlementSink for LogSink {
    fn on_settled(&self, event: &SettlementEvent) {
        info!(
            bet_id = %event.bet_id,
            winner = %event.winner,
            payout = %event.payout_amount,
            low_confidence = event.low_confidence,
            "💰 {event}"
        );
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct SettlementEngine {
    store: Arc<dyn BetRepository>,
    source: Arc<dyn GameResultSource>,
    lookback_days: u32,
    max_retry_attempts: u32,
    sinks: Vec<Arc<dyn SettlementSink>>,
}

impl SettlementEngine {
    pub fn new(store: Arc<dyn BetRepository>, source: Arc<dyn GameResultSource>) -> Self {
        Self {
            store,
            source,
            lookback_days: crate::results::DEFAULT_LOOKBACK_DAYS,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            sinks: vec![Arc::new(LogSink)],
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_max_retry_attempts(mut self, attempts: u32) -> Self {
        self.max_retry_attempts = attempts.max(1);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn SettlementSink>) {
        self.sinks.push(sink);
    }

    /// One settlement attempt for one bet. Never leaves a bet in a
    /// half-settled state: either the store transition commits and the
    /// event is emitted, or nothing changed.
    pub async fn try_settle(&self, bet_id: &str) -> SettlementResult {
        let bet = match self.store.get(bet_id) {
            Ok(bet) => bet,
            Err(e) => return SettlementResult::Rejected(e),
        };

        // Lifecycle gate up front so we never fetch scores for a bet
        // that can't settle anyway.
        match bet.status {
            BetStatus::Funded => {}
            BetStatus::Settled => {
                return SettlementResult::Rejected(BetError::AlreadySettled(bet.id))
            }
            BetStatus::Cancelled => {
                return SettlementResult::Rejected(BetError::AlreadyCancelled(bet.id))
            }
            BetStatus::Created => {
                return SettlementResult::Rejected(BetError::NotFunded {
                    bet_id: bet.id,
                    status: bet.status,
                })
            }
        }

        let result = match self
            .source
            .fetch(&bet.game_id, &bet.sport_key, self.lookback_days)
            .await
        {
            Ok(result) => result,
            Err(FetchError::NotFound(_)) => {
                debug!(bet_id = %bet.id, game_id = %bet.game_id, "Game not found yet, deferring");
                return SettlementResult::Deferred(DeferReason::GameNotFound);
            }
            Err(FetchError::Transport(msg)) => {
                warn!(bet_id = %bet.id, error = %msg, "Score fetch failed");
                return SettlementResult::Deferred(DeferReason::Transport(msg));
            }
            Err(FetchError::InsufficientScoreData(_)) => {
                warn!(bet_id = %bet.id, game_id = %bet.game_id, "Completed game missing scores");
                return SettlementResult::Deferred(DeferReason::InsufficientScoreData);
            }
        };

        let predicate = bet.prediction.predicate();
        let outcome = crate::evaluator::evaluate(predicate, &result);

        let challenger_wins = match outcome.as_bool() {
            Some(hit) => hit,
            None => {
                debug!(bet_id = %bet.id, game_id = %bet.game_id, "Game in progress, deferring");
                return SettlementResult::Deferred(DeferReason::GameInProgress);
            }
        };

        let low_confidence = predicate.is_low_confidence();
        if low_confidence {
            warn!(
                bet_id = %bet.id,
                prediction = %bet.prediction,
                predicate = %predicate,
                "Settling with low-confidence evaluation"
            );
        }

        // Atomic Funded → Settled step. A concurrent settler may have
        // beaten us here, in which case we lose the race cleanly.
        let settled = match self.store.settle(&bet.id, challenger_wins) {
            Ok(settled) => settled,
            Err(e) => return SettlementResult::Rejected(e),
        };

        let event = self.emit(&settled, outcome, low_confidence);
        SettlementResult::Completed(event)
    }

    /// `try_settle` with exponential backoff on transport failures.
    /// All other deferrals wait for the next tick instead of retrying
    /// in-line — the game state won't change in half a second.
    pub async fn try_settle_with_retry(&self, bet_id: &str) -> SettlementResult {
        let mut attempt = 1;
        loop {
            let result = self.try_settle(bet_id).await;
            match &result {
                SettlementResult::Deferred(DeferReason::Transport(msg))
                    if attempt < self.max_retry_attempts =>
                {
                    let delay = RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1);
                    warn!(
                        bet_id,
                        attempt,
                        max = self.max_retry_attempts,
                        error = %msg,
                        "Retrying in {delay}ms"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                _ => return result,
            }
        }
    }

    /// One settlement pass over every funded bet.
    pub async fn settle_all_funded(&self) -> Vec<(String, SettlementResult)> {
        let funded = self.store.list_by_status(BetStatus::Funded);
        if funded.is_empty() {
            debug!("No funded bets to settle");
            return Vec::new();
        }

        info!(count = funded.len(), "Settlement pass starting");

        let attempts = funded.iter().map(|bet| async {
            let result = self.try_settle_with_retry(&bet.id).await;
            (bet.id.clone(), result)
        });
        let results = futures::future::join_all(attempts).await;

        let completed = results.iter().filter(|(_, r)| r.is_completed()).count();
        let deferred = results.iter().filter(|(_, r)| r.is_deferred()).count();
        info!(completed, deferred, "Settlement pass finished");

        results
    }

    fn emit(&self, bet: &Bet, outcome: Outcome, low_confidence: bool) -> SettlementEvent {
        let event = SettlementEvent {
            bet_id: bet.id.clone(),
            winner: bet.winner.clone().unwrap_or_default(),
            outcome,
            payout_amount: bet.payout_amount(),
            low_confidence,
            settled_at: bet.settled_at.unwrap_or_else(Utc::now),
        };
        for sink in &self.sinks {
            sink.on_settled(&event);
        }
        event
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bets::store::InMemoryBetStore;
    use crate::results::MockGameResultSource;
    use crate::types::GameResult;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    fn lakers_win() -> GameResult {
        GameResult {
            game_id: "g1".to_string(),
            home_team: "Los Angeles Lakers".to_string(),
            away_team: "Golden State Warriors".to_string(),
            home_score: 112,
            away_score: 108,
            completed: true,
        }
    }

    fn funded_store(prediction: &str) -> Arc<InMemoryBetStore> {
        let store = Arc::new(InMemoryBetStore::new());
        store
            .put(Bet::new(
                "bet-1",
                prediction,
                "0xchallenger",
                "0xaccepter",
                "g1",
                "basketball_nba",
                dec!(5),
            ))
            .unwrap();
        store.deposit("bet-1", "0xchallenger").unwrap();
        store.deposit("bet-1", "0xaccepter").unwrap();
        store
    }

    fn engine_with(
        store: Arc<InMemoryBetStore>,
        source: MockGameResultSource,
    ) -> SettlementEngine {
        SettlementEngine::new(store, Arc::new(source))
    }

    #[tokio::test]
    async fn test_settles_hit_to_challenger() {
        let store = funded_store("Lakers will win");
        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(|_, _, _| Ok(lakers_win()));

        let engine = engine_with(Arc::clone(&store), source);
        let result = engine.try_settle("bet-1").await;

        match result {
            SettlementResult::Completed(event) => {
                assert_eq!(event.winner, "0xchallenger");
                assert_eq!(event.payout_amount, dec!(10));
                assert!(!event.low_confidence);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(store.get("bet-1").unwrap().status, BetStatus::Settled);
    }

    #[tokio::test]
    async fn test_settles_miss_to_accepter() {
        let store = funded_store("Warriors will win");
        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(|_, _, _| Ok(lakers_win()));

        let engine = engine_with(Arc::clone(&store), source);
        let result = engine.try_settle("bet-1").await;

        assert!(result.is_completed());
        assert_eq!(
            store.get("bet-1").unwrap().winner.as_deref(),
            Some("0xaccepter")
        );
    }

    #[tokio::test]
    async fn test_unfunded_bet_rejected_without_fetch() {
        let store = Arc::new(InMemoryBetStore::new());
        store
            .put(Bet::new(
                "bet-1",
                "Lakers will win",
                "0xchallenger",
                "0xaccepter",
                "g1",
                "basketball_nba",
                dec!(5),
            ))
            .unwrap();

        // No fetch expectation set: a call would panic the mock.
        let source = MockGameResultSource::new();
        let engine = engine_with(Arc::clone(&store), source);

        let result = engine.try_settle("bet-1").await;
        match result {
            SettlementResult::Rejected(BetError::NotFunded { status, .. }) => {
                assert_eq!(status, BetStatus::Created);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_incomplete_game_deferred() {
        let store = funded_store("Lakers will win");
        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(|_, _, _| {
            let mut result = lakers_win();
            result.completed = false;
            Ok(result)
        });

        let engine = engine_with(Arc::clone(&store), source);
        let result = engine.try_settle("bet-1").await;

        assert!(matches!(
            result,
            SettlementResult::Deferred(DeferReason::GameInProgress)
        ));
        assert_eq!(store.get("bet-1").unwrap().status, BetStatus::Funded);
    }

    #[tokio::test]
    async fn test_game_not_found_deferred() {
        let store = funded_store("Lakers will win");
        let mut source = MockGameResultSource::new();
        source
            .expect_fetch()
            .returning(|game_id, _, _| Err(FetchError::NotFound(game_id.to_string())));

        let engine = engine_with(Arc::clone(&store), source);
        let result = engine.try_settle("bet-1").await;

        assert!(matches!(
            result,
            SettlementResult::Deferred(DeferReason::GameNotFound)
        ));
        assert_eq!(store.get("bet-1").unwrap().status, BetStatus::Funded);
    }

    #[tokio::test]
    async fn test_transport_error_retried_then_succeeds() {
        let store = funded_store("Lakers will win");
        let calls = Arc::new(Mutex::new(0u32));
        let seen = Arc::clone(&calls);

        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(move |_, _, _| {
            let mut n = seen.lock().unwrap();
            *n += 1;
            if *n < 3 {
                Err(FetchError::Transport("connection reset".to_string()))
            } else {
                Ok(lakers_win())
            }
        });

        let engine = engine_with(Arc::clone(&store), source);
        let result = engine.try_settle_with_retry("bet-1").await;

        assert!(result.is_completed());
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_transport_error_gives_up_after_max_attempts() {
        let store = funded_store("Lakers will win");
        let calls = Arc::new(Mutex::new(0u32));
        let seen = Arc::clone(&calls);

        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(move |_, _, _| {
            *seen.lock().unwrap() += 1;
            Err(FetchError::Transport("timeout".to_string()))
        });

        let engine = engine_with(Arc::clone(&store), source).with_max_retry_attempts(2);
        let result = engine.try_settle_with_retry("bet-1").await;

        assert!(matches!(
            result,
            SettlementResult::Deferred(DeferReason::Transport(_))
        ));
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(store.get("bet-1").unwrap().status, BetStatus::Funded);
    }

    #[tokio::test]
    async fn test_game_not_found_not_retried_inline() {
        let store = funded_store("Lakers will win");
        let calls = Arc::new(Mutex::new(0u32));
        let seen = Arc::clone(&calls);

        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(move |game_id, _, _| {
            *seen.lock().unwrap() += 1;
            Err(FetchError::NotFound(game_id.to_string()))
        });

        let engine = engine_with(Arc::clone(&store), source);
        let result = engine.try_settle_with_retry("bet-1").await;

        assert!(result.is_deferred());
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_predicate_settles_low_confidence() {
        let store = funded_store("vibes only, trust me");
        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(|_, _, _| Ok(lakers_win()));

        let engine = engine_with(Arc::clone(&store), source);
        let result = engine.try_settle("bet-1").await;

        match result {
            SettlementResult::Completed(event) => {
                assert!(event.low_confidence);
                // Unknown evaluates to Miss, so the accepter collects.
                assert_eq!(event.winner, "0xaccepter");
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_settle_all_funded_skips_non_funded() {
        let store = Arc::new(InMemoryBetStore::new());
        for id in ["bet-1", "bet-2", "bet-3"] {
            store
                .put(Bet::new(
                    id,
                    "Lakers will win",
                    "0xchallenger",
                    "0xaccepter",
                    "g1",
                    "basketball_nba",
                    dec!(5),
                ))
                .unwrap();
        }
        // Only bet-2 reaches Funded.
        store.deposit("bet-2", "0xchallenger").unwrap();
        store.deposit("bet-2", "0xaccepter").unwrap();
        store.cancel("bet-3", "accepter backed out").unwrap();

        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(|_, _, _| Ok(lakers_win()));

        let engine = engine_with(Arc::clone(&store), source);
        let results = engine.settle_all_funded().await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "bet-2");
        assert!(results[0].1.is_completed());
        assert_eq!(store.get("bet-1").unwrap().status, BetStatus::Created);
        assert_eq!(store.get("bet-3").unwrap().status, BetStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_double_settle_second_rejected() {
        let store = funded_store("Lakers will win");
        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(|_, _, _| Ok(lakers_win()));

        let engine = engine_with(Arc::clone(&store), source);
        assert!(engine.try_settle("bet-1").await.is_completed());

        let second = engine.try_settle("bet-1").await;
        assert!(matches!(
            second,
            SettlementResult::Rejected(BetError::AlreadySettled(_))
        ));
    }

    #[tokio::test]
    async fn test_sink_receives_event() {
        struct Capture(Mutex<Vec<SettlementEvent>>);
        impl SettlementSink for Capture {
            fn on_settled(&self, event: &SettlementEvent) {
                self.0.lock().unwrap().push(event.clone());
            }
        }

        let store = funded_store("Lakers will win");
        let mut source = MockGameResultSource::new();
        source.expect_fetch().returning(|_, _, _| Ok(lakers_win()));

        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        let mut engine = engine_with(Arc::clone(&store), source);
        engine.add_sink(Arc::clone(&capture) as Arc<dyn SettlementSink>);

        engine.try_settle("bet-1").await;

        let events = capture.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].bet_id, "bet-1");
    }
}
