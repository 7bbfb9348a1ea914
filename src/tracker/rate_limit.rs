//! Per-tracker request throttling.
//!
//! Gazelle trackers allow a fixed number of API calls per time window
//! (commonly 5 per 10 seconds) and ban clients that exceed it. The limiter
//! keeps the start times of the most recent requests and waits until the
//! oldest one leaves the window before admitting another.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Sliding-window rate limiter: at most `max_requests` per `window`.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// `max_requests` is clamped to at least one.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let max_requests = max_requests.max(1) as usize;
        Self {
            max_requests,
            window,
            starts: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Wait until a request may be issued, then record it.
    ///
    /// The lock is held while sleeping so concurrent callers are admitted
    /// one at a time, in order.
    pub async fn acquire(&self) {
        let mut starts = self.starts.lock().await;

        loop {
            let now = Instant::now();
            while starts
                .front()
                .is_some_and(|&start| now.duration_since(start) >= self.window)
            {
                starts.pop_front();
            }

            if starts.len() < self.max_requests {
                starts.push_back(now);
                return;
            }

            if let Some(&oldest) = starts.front() {
                let wait = self.window.saturating_sub(now.duration_since(oldest));
                debug!("Rate limiting: waiting {:?}", wait);
                sleep(wait).await;
            }
        }
    }
}
