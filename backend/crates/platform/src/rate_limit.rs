//! Rate Limiting Infrastructure
//!
//! Configuration and decision types shared by the admission-control layer
//! and the binary that loads its configuration.

use std::time::Duration;

/// Response header carrying the configured quota
pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
/// Response header carrying the slots left in the current window
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
/// Response header carrying the unix timestamp of the next free slot
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// When false every request is admitted and no headers are written
    pub enabled: bool,
    /// Maximum requests admitted per window (the quota)
    pub requests_per_minute: u32,
    /// Reserved. Loaded and carried, not consumed by the sliding window.
    pub burst_size: u32,
    /// Length of the trailing window
    pub window: Duration,
    /// How often idle client state is swept
    pub cleanup_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 100,
            burst_size: 20,
            window: Duration::from_secs(60),
            cleanup_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_minute: u32, window: Duration) -> Self {
        Self {
            requests_per_minute,
            window,
            ..Self::default()
        }
    }
}

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the oldest counted request leaves the window. Zero when
    /// allowed.
    pub reset_in: Duration,
}

impl RateLimitDecision {
    pub fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            reset_in: Duration::ZERO,
        }
    }

    pub fn deny(reset_in: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_in,
        }
    }

    /// Whole seconds a client should wait, rounded up so that retrying
    /// after exactly this long always lands past the reset point.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_in.as_secs();
        if self.reset_in.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}
