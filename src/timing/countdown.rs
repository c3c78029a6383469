//! Self-driving countdowns with tick notifications

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::util::time::COUNTDOWN_TICK_MS;

/// Countdown scheduling options
#[derive(Debug, Clone, Copy)]
pub struct CountdownOptions {
    /// Cadence of `on_tick` notifications
    pub tick_interval: Duration,
}

impl Default for CountdownOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(COUNTDOWN_TICK_MS),
        }
    }
}

/// Handle to a running countdown.
///
/// Owns the countdown's scheduled task. The task is released exactly once:
/// it ends by itself after `on_complete`, or is aborted by [`cancel`]
/// (also run on drop). Use [`detach`] to let a countdown outlive its handle.
///
/// [`cancel`]: CountdownHandle::cancel
/// [`detach`]: CountdownHandle::detach
#[derive(Debug)]
#[must_use = "dropping the handle cancels the countdown"]
pub struct CountdownHandle {
    end: Instant,
    /// Held by the task while it checks `cancelled` and runs a callback, and by
    /// `cancel` while it sets `cancelled`. Reentrant so a callback may cancel
    /// its own countdown.
    gate: Arc<ReentrantMutex<()>>,
    cancelled: Arc<AtomicBool>,
    completed: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CountdownHandle {
    /// Time left until the end, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }

    pub fn end_time(&self) -> Instant {
        self.end
    }

    /// Still ticking: neither completed nor cancelled
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire) && !self.completed.load(Ordering::Acquire)
    }

    /// Stop the countdown. A callback that is running when this is called
    /// finishes first; none starts after this returns. Calling it again is a
    /// no-op.
    pub fn cancel(&self) {
        if let Some(task) = self.task.lock().take() {
            {
                let _gate = self.gate.lock();
                self.cancelled.store(true, Ordering::Release);
            }
            task.abort();
            if !self.completed.load(Ordering::Acquire) {
                debug!(remaining_ms = self.remaining().as_millis() as u64, "Countdown cancelled");
            }
        }
    }

    /// Give up ownership; the countdown keeps running to completion
    pub fn detach(self) {
        self.task.lock().take();
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start a countdown with the default tick cadence.
///
/// `on_tick(remaining)` fires every tick while time remains and
/// `on_complete()` fires exactly once when it runs out. Must be called from
/// within a tokio runtime.
pub fn start_countdown<T, C>(duration: Duration, on_tick: T, on_complete: C) -> CountdownHandle
where
    T: FnMut(Duration) + Send + 'static,
    C: FnOnce() + Send + 'static,
{
    start_countdown_with(duration, CountdownOptions::default(), on_tick, on_complete)
}

/// Start a countdown with explicit options
pub fn start_countdown_with<T, C>(
    duration: Duration,
    options: CountdownOptions,
    mut on_tick: T,
    on_complete: C,
) -> CountdownHandle
where
    T: FnMut(Duration) + Send + 'static,
    C: FnOnce() + Send + 'static,
{
    let start = Instant::now();
    let end = start + duration;
    let tick_interval = options.tick_interval.max(Duration::from_millis(1));

    let gate = Arc::new(ReentrantMutex::new(()));
    let cancelled = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicBool::new(false));

    let task_gate = gate.clone();
    let task_cancelled = cancelled.clone();
    let task_completed = completed.clone();

    debug!(
        duration_ms = duration.as_millis() as u64,
        tick_ms = tick_interval.as_millis() as u64,
        "Countdown started"
    );

    let task = tokio::spawn(async move {
        let mut next_tick = start + tick_interval;
        let mut on_complete = Some(on_complete);

        loop {
            sleep_until(next_tick.min(end)).await;

            let remaining = end.saturating_duration_since(Instant::now());
            {
                let _gate = task_gate.lock();
                if task_cancelled.load(Ordering::Acquire) {
                    return;
                }

                if !remaining.is_zero() {
                    on_tick(remaining);
                } else if let Some(on_complete) = on_complete.take() {
                    on_complete();
                    task_completed.store(true, Ordering::Release);
                    debug!("Countdown complete");
                    return;
                }
            }

            next_tick += tick_interval;
        }
    });

    CountdownHandle {
        end,
        gate,
        cancelled,
        completed,
        task: Mutex::new(Some(task)),
    }
}
