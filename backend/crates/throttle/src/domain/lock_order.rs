//! Lock hierarchy bookkeeping
//!
//! The limiter has two lock levels: the client map and the per-client
//! tracker. A thread holds at most one of them at a time. In debug builds
//! every acquisition records its level in a thread-local and panics if a
//! lock of either level is already held, so a nesting mistake fails loudly
//! in tests instead of deadlocking under load. Release builds compile the
//! bookkeeping away.

use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockLevel {
    /// ClientKey -> Tracker map
    Map,
    /// One client's request log
    Tracker,
}

#[cfg(debug_assertions)]
thread_local! {
    static HELD: std::cell::Cell<Option<LockLevel>> = const { std::cell::Cell::new(None) };
}

/// Marks the current thread as holding a lock of some level.
struct LevelGuard;

impl LevelGuard {
    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    fn enter(level: LockLevel) -> Self {
        #[cfg(debug_assertions)]
        HELD.with(|held| {
            if let Some(current) = held.get() {
                panic!(
                    "lock hierarchy violated: acquiring {level:?} lock while holding {current:?} lock"
                );
            }
            held.set(Some(level));
        });
        LevelGuard
    }
}

impl Drop for LevelGuard {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        HELD.with(|held| held.set(None));
    }
}

/// A mutex that takes part in the lock hierarchy.
pub(crate) struct OrderedMutex<T> {
    level: LockLevel,
    inner: Mutex<T>,
}

impl<T> OrderedMutex<T> {
    pub(crate) const fn new(level: LockLevel, value: T) -> Self {
        Self {
            level,
            inner: Mutex::new(value),
        }
    }

    /// The hierarchy check runs before blocking on the mutex.
    pub(crate) fn lock(&self) -> OrderedGuard<'_, T> {
        let level = LevelGuard::enter(self.level);
        OrderedGuard {
            guard: self.inner.lock(),
            _level: level,
        }
    }
}

/// Scoped guard; unlocks, then clears the held level.
pub(crate) struct OrderedGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    _level: LevelGuard,
}

impl<T> Deref for OrderedGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for OrderedGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
