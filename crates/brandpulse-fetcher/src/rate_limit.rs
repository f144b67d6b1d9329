//! Sliding-window rate limiter for the content API.
//!
//! The provider enforces a rolling request ceiling (e.g. 100 requests per
//! second). [`RateLimiter::acquire`] blocks the calling task until a slot is
//! free, then reserves it; reservations expire on their own once the window
//! has elapsed. The limiter never errors — it only delays.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Shared sliding-window limiter. Cheap to share via `Arc`; the internal
/// mutex is the only coordination between concurrent tasks.
///
/// Admission is approximately FIFO: waiters queue on the mutex in arrival
/// order. No fairness guarantee beyond that.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    stamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// A limiter allowing `max_requests` per rolling `window`.
    ///
    /// # Panics
    ///
    /// Panics if `max_requests` is zero — such a limiter could never admit
    /// anything and `acquire` would block forever.
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        assert!(max_requests > 0, "rate limiter needs at least one slot");
        Self {
            max_requests,
            window,
            stamps: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Block until a request slot is free, then reserve it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut stamps = self.stamps.lock().await;
                let now = Instant::now();
                while stamps
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    stamps.pop_front();
                }

                if stamps.len() < self.max_requests {
                    stamps.push_back(now);
                    return;
                }

                // Oldest reservation determines when the next slot opens.
                let oldest = *stamps.front().unwrap_or(&now);
                self.window.saturating_sub(now.duration_since(oldest))
            };

            tracing::trace!(wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "rate limit reached — waiting for a slot");
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    /// Number of reservations currently inside the window. Test hook.
    pub async fn in_flight(&self) -> usize {
        let mut stamps = self.stamps.lock().await;
        let now = Instant::now();
        while stamps
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            stamps.pop_front();
        }
        stamps.len()
    }
}
