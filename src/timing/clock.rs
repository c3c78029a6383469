//! Elapsed-time tracking with explicit pause/resume

use std::time::Duration;

use tokio::time::Instant;

/// Elapsed-time tracker for one timed entity (a turn, a search, a round).
///
/// Time spent paused is excluded: on resume the origin is shifted forward by
/// the paused span, so the elapsed trajectory continues where it stopped.
#[derive(Debug, Clone)]
pub struct Clock {
    origin: Instant,
    /// Set while paused
    paused_at: Option<Instant>,
}

impl Clock {
    /// Create a running clock with origin = now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            paused_at: None,
        }
    }

    /// Re-arm: origin = now, running. Resets a paused clock too.
    pub fn start(&mut self) {
        self.origin = Instant::now();
        self.paused_at = None;
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.origin += Instant::now().saturating_duration_since(paused_at);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Running time so far, frozen while paused
    pub fn elapsed(&self) -> Duration {
        match self.paused_at {
            Some(paused_at) => paused_at.saturating_duration_since(self.origin),
            None => Instant::now().saturating_duration_since(self.origin),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Whether `limit` of running time has passed (turn or search timeout)
    pub fn has_elapsed(&self, limit: Duration) -> bool {
        self.elapsed() >= limit
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn pause_window_is_excluded() {
        let mut clock = Clock::new();

        advance(ms(1000)).await;
        clock.pause();
        advance(ms(4000)).await;
        clock.resume();
        advance(ms(1000)).await;

        assert_eq!(clock.elapsed(), ms(2000));
        assert_eq!(clock.elapsed_secs(), 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_is_frozen_while_paused() {
        let mut clock = Clock::new();
        advance(ms(300)).await;
        clock.pause();
        assert!(clock.is_paused());

        advance(ms(10_000)).await;
        assert_eq!(clock.elapsed(), ms(300));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_are_idempotent() {
        let mut clock = Clock::new();
        advance(ms(100)).await;
        clock.resume(); // never paused
        assert_eq!(clock.elapsed(), ms(100));

        clock.pause();
        advance(ms(50)).await;
        clock.pause(); // second pause keeps the first timestamp
        advance(ms(50)).await;
        clock.resume();
        clock.resume();
        advance(ms(25)).await;

        assert_eq!(clock.elapsed(), ms(125));
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_a_full_reset() {
        let mut clock = Clock::new();
        advance(ms(700)).await;
        clock.pause();

        clock.start();
        assert!(!clock.is_paused());
        assert_eq!(clock.elapsed(), Duration::ZERO);

        advance(ms(40)).await;
        assert_eq!(clock.elapsed(), ms(40));
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_never_decreases() {
        let mut clock = Clock::new();
        let mut last = Duration::ZERO;

        for step in 0..20u64 {
            advance(ms(10 + step)).await;
            if step % 3 == 0 {
                clock.pause();
            } else if step % 3 == 1 {
                clock.resume();
            }
            let now = clock.elapsed();
            assert!(now >= last);
            last = now;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_check() {
        let clock = Clock::new();
        advance(ms(2999)).await;
        assert!(!clock.has_elapsed(ms(3000)));
        advance(ms(1)).await;
        assert!(clock.has_elapsed(ms(3000)));
    }
}
