//! Shared rate limiter for outbound provider calls.
//!
//! One limiter is shared across all providers so the *total* outbound call
//! rate stays bounded, regardless of which backend each call lands on.
//! Calls are issued serially per user action, so a single-waiter FIFO model
//! is sufficient.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Enforces a minimum wall-clock interval between outbound calls.
///
/// [`RateLimiter::wait`] never errors; it only delays.  The lock is held for
/// the slot reservation only, never across the sleep.
pub struct RateLimiter {
    min_interval: Duration,
    // Timestamp of the most recently reserved call slot.
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter enforcing `min_interval` between calls.
    ///
    /// `Duration::ZERO` disables the delay entirely (useful for tests).
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Block the calling task until at least `min_interval` has elapsed
    /// since the previously reserved call slot, then reserve the next one.
    pub async fn wait(&self) {
        let delay = {
            let mut last = self
                .last_call
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            match *last {
                Some(prev) => {
                    let next = prev + self.min_interval;
                    if next > now {
                        // Reserve the future slot before sleeping so a second
                        // waiter queues behind it rather than alongside it.
                        *last = Some(next);
                        next - now
                    } else {
                        *last = Some(now);
                        Duration::ZERO
                    }
                }
                None => {
                    *last = Some(now);
                    Duration::ZERO
                }
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
