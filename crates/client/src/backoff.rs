//! Fibonacci backoff for the job poll loop.
//!
//! The delay sequence starts with the initial value twice, then follows the
//! Fibonacci recurrence, capped so a slow job is still polled at a steady
//! rate: 100ms, 100ms, 200ms, 300ms, 500ms, ..., 2s, 2s, ...

use cribl_search_config::constants::{BACKOFF_INITIAL_MS, MAX_BACKOFF_MS};
use std::time::Duration;

/// Stateful backoff delay generator.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    current: Duration,
    next: Duration,
    cap: Duration,
}

impl FibonacciBackoff {
    pub fn new(initial: Duration, cap: Duration) -> Self {
        Self {
            current: initial,
            next: initial,
            cap,
        }
    }

    /// Return the next delay to sleep before re-polling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current.min(self.cap);
        // Stop advancing once the cap is reached, so the terms cannot overflow
        // no matter how many iterations the poll loop runs.
        if self.current < self.cap {
            (self.current, self.next) = (self.next, self.current + self.next);
        }
        delay
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(BACKOFF_INITIAL_MS),
            Duration::from_millis(MAX_BACKOFF_MS),
        )
    }
}
