use serde::{Deserialize, Serialize};

/// Minimum gap between two diagnostics recomputations, in microseconds.
pub const REFRESH_INTERVAL_US: u32 = 1_000_000;

/// Throttles periodic work against a free-running `u32` microsecond counter.
///
/// Elapsed time is computed with wrapping subtraction, so the limiter keeps
/// working across counter overflow (every ~71.6 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiter {
    interval_us: u32,
    last_update_us: u32,
}

impl RateLimiter {
    pub fn new(interval_us: u32) -> Self {
        Self {
            interval_us,
            last_update_us: 0,
        }
    }

    /// Returns true and marks `now_us` as the last update if strictly more
    /// than one interval has elapsed since the previous mark.
    pub fn try_acquire(&mut self, now_us: u32) -> bool {
        if self.elapsed_us(now_us) > self.interval_us {
            self.last_update_us = now_us;
            true
        } else {
            false
        }
    }

    /// Record `now_us` as the last update without checking the interval.
    pub fn mark(&mut self, now_us: u32) {
        self.last_update_us = now_us;
    }

    pub fn elapsed_us(&self, now_us: u32) -> u32 {
        now_us.wrapping_sub(self.last_update_us)
    }

    pub fn last_update_us(&self) -> u32 {
        self.last_update_us
    }

    pub fn interval_us(&self) -> u32 {
        self.interval_us
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(REFRESH_INTERVAL_US)
    }
}
