//! SENDBET — peer-to-peer sports wager settlement core
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod predicate;
pub mod evaluator;
pub mod results;
pub mod bets;
pub mod engine;
pub mod storage;
