//! Persistence layer.
//!
//! Saves and loads the bet book to/from a JSON file so funded bets
//! survive a restart. The on-chain escrow is the source of truth for
//! money; this snapshot only carries the settlement bookkeeping.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::types::Bet;

/// Default bet book file path.
const DEFAULT_STATE_FILE: &str = "sendbet_state.json";

/// Save the bet book to a JSON file.
pub fn save_bets(bets: &[Bet], path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    let json = serde_json::to_string_pretty(bets)
        .context("Failed to serialise bet book")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write bet book to {path}"))?;

    debug!(path, count = bets.len(), "Bet book saved");
    Ok(())
}

/// Load the bet book from a JSON file.
/// Returns None if the file doesn't exist (fresh start).
pub fn load_bets(path: Option<&str>) -> Result<Option<Vec<Bet>>> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved bet book found, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read bet book from {path}"))?;

    let bets: Vec<Bet> = serde_json::from_str(&json)
        .context(format!("Failed to parse bet book from {path}"))?;

    info!(path, count = bets.len(), "Bet book loaded from disk");

    Ok(Some(bets))
}

/// Delete the bet book file (for testing or reset).
pub fn delete_bets(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete bet book file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
