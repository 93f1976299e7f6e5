//! SendBet — Peer-to-Peer Sports Wager Settlement Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the bet book from disk (or starts fresh), and runs the
//! periodic settlement loop with graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use sendbet::bets::store::{BetRepository, InMemoryBetStore};
use sendbet::config;
use sendbet::engine::SettlementEngine;
use sendbet::results::odds_api::OddsApiClient;
use sendbet::storage;
use sendbet::types::BetStatus;

const BANNER: &str = r#"
 ____                 _ ____       _
/ ___|  ___ _ __   __| | __ )  ___| |_
\___ \ / _ \ '_ \ / _` |  _ \ / _ \ __|
 ___) |  __/ | | | (_| | |_) |  __/ |_
|____/ \___|_| |_|\__,_|____/ \___|\__|

  Peer-to-Peer Sports Wager Settlement
  v0.1.0 — Settlement Engine
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        settle_interval_secs = cfg.engine.settle_interval_secs,
        lookback_days = cfg.engine.lookback_days,
        default_sport = %cfg.odds_api.default_sport_key,
        "SendBet settlement engine starting up"
    );

    // -- Restore or create the bet book ----------------------------------

    let state_file = cfg.engine.state_file.clone();
    let store = match storage::load_bets(state_file.as_deref())? {
        Some(bets) => {
            let funded = bets
                .iter()
                .filter(|b| b.status == BetStatus::Funded)
                .count();
            info!(total = bets.len(), funded, "Resumed bet book from disk");
            Arc::new(InMemoryBetStore::from_bets(bets))
        }
        None => {
            info!("Fresh start");
            Arc::new(InMemoryBetStore::new())
        }
    };

    // -- Initialise components -------------------------------------------

    let api_key = std::env::var(&cfg.odds_api.api_key_env).unwrap_or_default();
    if api_key.is_empty() {
        warn!(
            env = %cfg.odds_api.api_key_env,
            "No Odds API key configured — score fetches will fail and bets will stay funded"
        );
    }

    let source = Arc::new(OddsApiClient::new(api_key)?);
    let engine = SettlementEngine::new(
        Arc::clone(&store) as Arc<dyn BetRepository>,
        source,
    )
    .with_lookback_days(cfg.engine.lookback_days)
    .with_max_retry_attempts(cfg.engine.max_retry_attempts);

    // -- Main loop -------------------------------------------------------

    let settle_interval = Duration::from_secs(cfg.engine.settle_interval_secs);
    let mut interval = tokio::time::interval(settle_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.engine.settle_interval_secs,
        "Entering settlement loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let results = engine.settle_all_funded().await;
                if results.iter().any(|(_, r)| r.is_completed()) {
                    // Persist after any terminal transition
                    if let Err(e) = storage::save_bets(&store.snapshot(), state_file.as_deref()) {
                        error!(error = %e, "Failed to save bet book");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    // Save final state
    storage::save_bets(&store.snapshot(), state_file.as_deref())?;
    info!(
        total = store.len(),
        settled = store.list_by_status(BetStatus::Settled).len(),
        funded = store.list_by_status(BetStatus::Funded).len(),
        "SendBet shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sendbet=info"));

    let json_logging = std::env::var("SENDBET_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
