//! Sliding window tracker
//!
//! One client's log of accepted-request timestamps. The decision is
//! recomputed from the exact timestamps on every call, so there is no
//! fixed-window boundary at which a client can burst twice its quota.

use platform::client::ClientKey;
use platform::rate_limit::RateLimitDecision;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use super::lock_order::{LockLevel, OrderedMutex};

struct RequestLog {
    /// Accepted requests, in lock acquisition order
    entries: VecDeque<Instant>,
    /// Last decision of any outcome
    last_seen: Instant,
}

/// Rate limit state for a single client
pub struct Tracker {
    key: ClientKey,
    log: OrderedMutex<RequestLog>,
    /// Bumped under the tracker lock on every decision. Read without the
    /// lock by the reaper to detect activity since it last looked.
    generation: AtomicU64,
}

impl Tracker {
    pub fn new(key: ClientKey, now: Instant) -> Self {
        Self {
            key,
            log: OrderedMutex::new(
                LockLevel::Tracker,
                RequestLog {
                    entries: VecDeque::new(),
                    last_seen: now,
                },
            ),
            generation: AtomicU64::new(0),
        }
    }

    pub fn key(&self) -> &ClientKey {
        &self.key
    }

    /// Admit or reject one request at `now`.
    ///
    /// Entries older than `now - window` are discarded first. If `quota`
    /// entries remain the request is rejected and `reset_in` is the time
    /// until the oldest of them leaves the window; otherwise `now` is
    /// appended.
    pub fn decide(&self, quota: u32, window: Duration, now: Instant) -> RateLimitDecision {
        let mut log = self.log.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if now > log.last_seen {
            log.last_seen = now;
        }

        // Near process start `now - window` may predate the clock's origin,
        // in which case nothing can be out of the window yet.
        if let Some(window_start) = now.checked_sub(window) {
            log.entries.retain(|&at| at >= window_start);
        }

        let count = log.entries.len();
        if count >= quota as usize {
            let reset_in = match log.entries.iter().min() {
                Some(&oldest) => (oldest + window).saturating_duration_since(now),
                None => window,
            };
            return RateLimitDecision::deny(reset_in);
        }

        log.entries.push_back(now);
        RateLimitDecision::allow(quota - (count as u32 + 1))
    }

    /// Generation observed if the tracker has been idle longer than
    /// `retention` at `now`, `None` otherwise.
    ///
    /// Idle means the most recent accepted request, or the last decision
    /// when nothing was ever accepted, is older than `retention`.
    pub(crate) fn idle_generation(&self, retention: Duration, now: Instant) -> Option<u64> {
        let log = self.log.lock();
        let last_activity = log.entries.back().copied().unwrap_or(log.last_seen);
        let idle = now.saturating_duration_since(last_activity) > retention;
        idle.then(|| self.generation.load(Ordering::Acquire))
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Requests currently counted against the client
    pub fn logged(&self) -> usize {
        self.log.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    fn tracker(now: Instant) -> Tracker {
        Tracker::new(ClientKey::new("192.168.1.1"), now)
    }

    #[test]
    fn test_allows_up_to_quota() {
        let now = Instant::now();
        let t = tracker(now);

        let remaining: Vec<u32> = (0..3).map(|_| t.decide(3, WINDOW, now).remaining).collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let denied = t.decide(3, WINDOW, now);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(t.logged(), 3);
    }

    #[test]
    fn test_denied_requests_are_not_logged() {
        let now = Instant::now();
        let t = tracker(now);
        t.decide(1, WINDOW, now);
        for _ in 0..10 {
            assert!(!t.decide(1, WINDOW, now).allowed);
        }
        assert_eq!(t.logged(), 1);
    }

    #[test]
    fn test_reset_in_tracks_oldest_entry() {
        let start = Instant::now();
        let t = tracker(start);
        t.decide(2, WINDOW, start);
        t.decide(2, WINDOW, start + Duration::from_secs(10));

        let denied = t.decide(2, WINDOW, start + Duration::from_secs(20));
        assert!(!denied.allowed);
        assert_eq!(denied.reset_in, Duration::from_secs(40));
    }

    #[test]
    fn test_entries_slide_out_of_window() {
        let start = Instant::now();
        let t = tracker(start);
        t.decide(2, WINDOW, start);
        t.decide(2, WINDOW, start + Duration::from_secs(30));
        assert!(!t.decide(2, WINDOW, start + Duration::from_secs(59)).allowed);

        // the first entry has aged out, the second has not
        let later = start + Duration::from_secs(61);
        let decision = t.decide(2, WINDOW, later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(t.logged(), 2);
    }

    #[test]
    fn test_entry_exactly_at_window_start_still_counts() {
        let start = Instant::now();
        let t = tracker(start);
        t.decide(1, WINDOW, start);
        assert!(!t.decide(1, WINDOW, start + WINDOW).allowed);
        assert!(t.decide(1, WINDOW, start + WINDOW + Duration::from_nanos(1)).allowed);
    }

    #[test]
    fn test_zero_quota_denies_with_full_window() {
        let now = Instant::now();
        let t = tracker(now);
        let decision = t.decide(0, WINDOW, now);
        assert!(!decision.allowed);
        assert_eq!(decision.reset_in, WINDOW);
        assert_eq!(t.logged(), 0);
    }

    #[test]
    fn test_idle_generation() {
        let start = Instant::now();
        let t = tracker(start);
        t.decide(5, WINDOW, start);
        let retention = WINDOW * 2;

        assert_eq!(t.idle_generation(retention, start + retention), None);
        assert_eq!(
            t.idle_generation(retention, start + retention + Duration::from_secs(1)),
            Some(1)
        );
    }

    #[test]
    fn test_fresh_tracker_is_not_idle() {
        let now = Instant::now();
        let t = tracker(now);
        assert_eq!(t.idle_generation(WINDOW * 2, now), None);
    }

    #[test]
    fn test_generation_counts_every_decision() {
        let now = Instant::now();
        let t = tracker(now);
        t.decide(1, WINDOW, now);
        t.decide(1, WINDOW, now);
        assert_eq!(t.generation(), 2);
    }
}
