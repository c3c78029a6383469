//! Wall-clock helpers

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Default polling cadence for countdown ticks
pub const COUNTDOWN_TICK_MS: u64 = 100; // 10 ticks per second
