//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub odds_api: OddsApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Seconds between settlement passes.
    pub settle_interval_secs: u64,
    /// How many days back the score lookup searches.
    pub lookback_days: u32,
    /// Attempts per bet on transport failures before deferring.
    pub max_retry_attempts: u32,
    /// Bet book snapshot file.
    #[serde(default)]
    pub state_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OddsApiConfig {
    pub api_key_env: String,
    /// Sport key used when a bet doesn't carry one.
    pub default_sport_key: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        // This test requires config.toml to be in the working directory.
        // In CI, copy config.toml to the test working dir.
        let result = AppConfig::load("config.toml");
        if let Ok(cfg) = result {
            assert!(cfg.engine.settle_interval_secs > 0);
            assert!(cfg.engine.lookback_days >= 1);
            assert!(cfg.engine.max_retry_attempts >= 1);
            assert_eq!(cfg.odds_api.api_key_env, "ODDS_API_KEY");
        }
        // If config.toml isn't found, that's acceptable in some test environments
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
            [engine]
            settle_interval_secs = 60
            lookback_days = 3
            max_retry_attempts = 3

            [odds_api]
            api_key_env = "ODDS_API_KEY"
            default_sport_key = "basketball_nba"
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.engine.settle_interval_secs, 60);
        assert!(cfg.engine.state_file.is_none());
        assert_eq!(cfg.odds_api.default_sport_key, "basketball_nba");
    }
}
