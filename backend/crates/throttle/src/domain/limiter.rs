//! Rate limiter core
//!
//! Owns the ClientKey -> Tracker map. The map lock is held only to look up,
//! insert or remove trackers; the decision itself runs under the tracker's
//! own lock after the map lock is released.

use platform::client::ClientKey;
use platform::rate_limit::{RateLimitConfig, RateLimitDecision};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::lock_order::{LockLevel, OrderedMutex};
use super::tracker::Tracker;

/// Result of one eviction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReapStats {
    pub evicted: usize,
    pub remaining: usize,
}

/// Per-client sliding window rate limiter
pub struct RateLimiter {
    quota: u32,
    window: Duration,
    trackers: OrderedMutex<HashMap<ClientKey, Arc<Tracker>>>,
}

impl RateLimiter {
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota,
            window,
            trackers: OrderedMutex::new(LockLevel::Map, HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_minute, config.window)
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Idle time after which a tracker is evicted.
    ///
    /// Twice the window, so a client whose next request is just about due
    /// is not forgotten at the exact boundary.
    pub fn retention(&self) -> Duration {
        self.window.saturating_mul(2)
    }

    /// Decide whether `key` may make a request now.
    pub fn decide(&self, key: &ClientKey) -> RateLimitDecision {
        self.decide_at(key, Instant::now())
    }

    pub fn decide_at(&self, key: &ClientKey, now: Instant) -> RateLimitDecision {
        let tracker = self.tracker(key, now);
        tracker.decide(self.quota, self.window, now)
    }

    /// Get or lazily create the tracker for `key`.
    fn tracker(&self, key: &ClientKey, now: Instant) -> Arc<Tracker> {
        let mut trackers = self.trackers.lock();
        if let Some(tracker) = trackers.get(key.as_str()) {
            return Arc::clone(tracker);
        }
        let tracker = Arc::new(Tracker::new(key.clone(), now));
        trackers.insert(key.clone(), Arc::clone(&tracker));
        tracker
    }

    /// Evict trackers idle longer than [`retention`](Self::retention).
    pub fn reap(&self) -> ReapStats {
        self.reap_at(Instant::now())
    }

    /// Eviction pass in three steps, never nesting the two lock levels:
    ///
    /// 1. snapshot the trackers under the map lock
    /// 2. inspect each snapshot under its own lock, remembering its
    ///    generation if idle
    /// 3. under the map lock again, remove a tracker only if it is still the
    ///    mapped instance, made no decision since step 2, and nobody but the
    ///    map and this pass holds a reference to it
    ///
    /// Requests clone a tracker out of the map under the map lock, so the
    /// reference count check in step 3 rules out a request that has looked
    /// the tracker up but not yet decided.
    pub fn reap_at(&self, now: Instant) -> ReapStats {
        let retention = self.retention();

        let snapshot: Vec<Arc<Tracker>> = self.trackers.lock().values().cloned().collect();

        let idle: Vec<(Arc<Tracker>, u64)> = snapshot
            .into_iter()
            .filter_map(|tracker| {
                let generation = tracker.idle_generation(retention, now)?;
                Some((tracker, generation))
            })
            .collect();

        let mut trackers = self.trackers.lock();
        let mut evicted = 0;
        for (tracker, generation) in idle {
            let still_mapped = trackers
                .get(tracker.key().as_str())
                .is_some_and(|mapped| Arc::ptr_eq(mapped, &tracker));
            let unreferenced = Arc::strong_count(&tracker) == 2;
            let untouched = tracker.generation() == generation;

            if still_mapped && unreferenced && untouched {
                trackers.remove(tracker.key().as_str());
                evicted += 1;
            }
        }

        ReapStats {
            evicted,
            remaining: trackers.len(),
        }
    }

    /// Number of clients currently tracked
    pub fn len(&self) -> usize {
        self.trackers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &ClientKey) -> bool {
        self.trackers.lock().contains_key(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ClientKey {
        ClientKey::new(s)
    }

    #[test]
    fn test_tracker_created_lazily() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.is_empty());

        limiter.decide(&key("10.0.0.1"));
        assert_eq!(limiter.len(), 1);
        assert!(limiter.contains(&key("10.0.0.1")));

        limiter.decide(&key("10.0.0.1"));
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = RateLimitConfig::new(7, Duration::from_secs(10));
        let limiter = RateLimiter::from_config(&config);
        assert_eq!(limiter.quota(), 7);
        assert_eq!(limiter.window(), Duration::from_secs(10));
        assert_eq!(limiter.retention(), Duration::from_secs(20));
    }

    #[test]
    fn test_reap_keeps_recent_clients() {
        let start = Instant::now();
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        limiter.decide_at(&key("a"), start);

        let stats = limiter.reap_at(start + Duration::from_secs(2));
        assert_eq!(stats, ReapStats { evicted: 0, remaining: 1 });
    }

    #[test]
    fn test_reap_skips_tracker_held_by_request() {
        let start = Instant::now();
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        limiter.decide_at(&key("a"), start);

        // a request that looked the tracker up but has not decided yet
        let in_flight = limiter.tracker(&key("a"), start);

        let stats = limiter.reap_at(start + Duration::from_secs(10));
        assert_eq!(stats.evicted, 0);
        assert!(limiter.contains(&key("a")));

        drop(in_flight);
        let stats = limiter.reap_at(start + Duration::from_secs(10));
        assert_eq!(stats.evicted, 1);
        assert!(!limiter.contains(&key("a")));
    }

    #[test]
    fn test_client_returns_after_eviction_with_fresh_window() {
        let start = Instant::now();
        let limiter = RateLimiter::new(1, Duration::from_secs(1));
        assert!(limiter.decide_at(&key("a"), start).allowed);

        let later = start + Duration::from_secs(5);
        limiter.reap_at(later);
        assert!(limiter.is_empty());

        let decision = limiter.decide_at(&key("a"), later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);
    }
}
