//! Game result sources.
//!
//! Defines the `GameResultSource` trait and provides The Odds API
//! implementation. Test harnesses substitute the trait with fixtures.

pub mod odds_api;

use async_trait::async_trait;

use crate::types::{FetchError, GameResult};

/// Default lookback window for score queries, in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 3;

/// Abstraction over external score data.
///
/// One read per call, scoped by sport key and a lookback window.
/// Implementors never interpret `completed`; it is passed through in
/// the `GameResult` for the evaluator to act on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameResultSource: Send + Sync {
    /// Fetch the result for one game.
    async fn fetch(
        &self,
        game_id: &str,
        sport_key: &str,
        lookback_days: u32,
    ) -> Result<GameResult, FetchError>;
}
