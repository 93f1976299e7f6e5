//! Settlement orchestration.
//!
//! Ties the pieces together: pull funded bets from the repository,
//! fetch final scores, run the evaluator, and commit the outcome back
//! through the atomic store transition. Everything here is
//! crash-tolerant by construction — a failed attempt leaves the bet
//! `Funded` and the next tick tries again.

pub mod settler;

pub use settler::{LogSink, SettlementEngine, SettlementSink};
