//! Pause-aware clocks, countdowns and delays
//!
//! Time comes from `tokio::time::Instant`, so paused-clock tests drive every
//! primitive here deterministically.

mod clock;
mod countdown;

pub use clock::Clock;
pub use countdown::{start_countdown, start_countdown_with, CountdownHandle, CountdownOptions};

use std::time::Duration;

/// Suspend the current task for `duration` without blocking other tasks.
///
/// Meant for fixed pacing between steps (e.g. round transitions); timeouts that
/// decide game outcomes should use a countdown.
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
