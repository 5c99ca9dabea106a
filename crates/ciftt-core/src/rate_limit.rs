//! Sliding-window rate limiting for tracker calls.
//!
//! The window holds the admission times of recent calls, oldest first.
//! Admission evicts entries older than the period, waits for the oldest entry
//! to expire when the window is full, then records the (post-wait) time.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time source used by the limiter. Tests substitute a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ---------------------------------------------------------------------------
// RateLimiter
// ---------------------------------------------------------------------------

pub struct RateLimiter {
    limit: usize,
    period: Duration,
    clock: Box<dyn Clock>,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: usize, period: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            limit: limit.max(1),
            period,
            clock,
            window: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_PERIOD, clock)
    }

    /// Block until a call may proceed, then record it.
    ///
    /// The window lock is held across the wait so concurrent callers are
    /// admitted one at a time. Returns how long the caller was suspended.
    pub fn acquire(&self) -> Duration {
        let mut window = self
            .window
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = self.clock.now();
        evict_expired(&mut window, now, self.period);

        let mut waited = Duration::ZERO;
        if window.len() >= self.limit {
            if let Some(&oldest) = window.front() {
                waited = self.period.saturating_sub(now.saturating_duration_since(oldest));
                tracing::info!(
                    wait_secs = waited.as_secs_f64(),
                    "GitHub API rate limit reached, sleeping"
                );
                self.clock.sleep(waited);
                window.pop_front();
            }
        }

        window.push_back(self.clock.now());
        waited
    }

    /// Number of calls recorded in the window (expired entries included until
    /// the next admission evicts them).
    pub fn in_window(&self) -> usize {
        self.window
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limit", &self.limit)
            .field("period", &self.period)
            .field("in_window", &self.in_window())
            .finish()
    }
}

fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while let Some(&oldest) = window.front() {
        if now.saturating_duration_since(oldest) > period {
            window.pop_front();
        } else {
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
