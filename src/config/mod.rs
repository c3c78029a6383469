//! Configuration module - environment variable parsing for the demo room

use std::env;
use std::time::Duration;

/// Demo configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Time a player has for one move before the turn times out
    pub turn_limit: Duration,
    /// Countdown shown before the round starts
    pub round_countdown: Duration,
    /// Tick cadence for the round countdown banner
    pub countdown_tick: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            turn_limit: millis_var("TURN_LIMIT_MS", 3000)?,
            round_countdown: millis_var("ROUND_COUNTDOWN_MS", 1500)?,
            countdown_tick: millis_var("COUNTDOWN_TICK_MS", 250)?,
        })
    }
}

fn millis_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidMillis(name)),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {0} must be a whole number of milliseconds")]
    InvalidMillis(&'static str),
}
