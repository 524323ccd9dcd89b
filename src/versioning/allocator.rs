//! Atomic version allocation.
//!
//! `allocate_next` must uphold one guarantee: at most one caller per key
//! may observe and consume a given integer. The read-current-max /
//! write-max-plus-one sequence is serialized through a mutex scoped to the
//! key, held only for the duration of that critical section and released
//! on completion or failure. Callers that fail to acquire the lock within
//! the configured timeout get `Error::LockTimeout` and should retry the
//! whole allocation, never a partial read/write.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// Default wait before giving up on a contended key.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

// ─────────────────────────────────────────────────────────────────
// Version Store
// ─────────────────────────────────────────────────────────────────

/// Durable counter keyed by persona slug.
///
/// Implementations only need to answer "what is the highest version
/// recorded for this key" and persist a newly allocated one; all mutual
/// exclusion is provided by [`VersionAllocator`].
pub trait VersionStore: Send + Sync {
    /// Highest version recorded for `key`, or 0 if none exist.
    fn current_max(&self, key: &str) -> Result<u32>;

    /// Persist a newly allocated version for `key`.
    fn record(&self, key: &str, version: u32) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────
// Keyed Locks
// ─────────────────────────────────────────────────────────────────

/// Registry of per-key mutexes.
///
/// Locks are created on first use and kept for the process lifetime; the
/// set of personas a process builds is small and bounded.
pub struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` while holding the mutex for `key`.
    ///
    /// Returns `Error::LockTimeout` if the lock cannot be acquired within
    /// `timeout`. Locks for different keys never contend.
    pub fn run_exclusive<T>(
        &self,
        key: &str,
        timeout: Duration,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let slot = {
            let mut slots = self.slots.lock();
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let _guard = slot
            .try_lock_for(timeout)
            .ok_or_else(|| Error::lock_timeout(key, timeout.as_millis() as u64))?;

        f()
    }
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────
// Version Allocator
// ─────────────────────────────────────────────────────────────────

/// Allocates monotonically increasing version numbers per persona key.
pub struct VersionAllocator<S: VersionStore> {
    store: S,
    locks: KeyedLocks,
    lock_timeout: Duration,
}

impl<S: VersionStore> VersionAllocator<S> {
    pub fn new(store: S) -> Self {
        Self::with_lock_timeout(store, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(store: S, lock_timeout: Duration) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            lock_timeout,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Atomically assign the next version for `key`.
    ///
    /// The returned number is consumed even if the caller's build later
    /// fails, so version sequences may have gaps in use but never
    /// duplicates in allocation.
    pub fn allocate_next(&self, key: &str) -> Result<u32> {
        self.locks.run_exclusive(key, self.lock_timeout, || {
            let max = self.store.current_max(key)?;
            let next = max + 1;
            self.store.record(key, next)?;
            debug!(key, version = next, "Version allocated");
            Ok(next)
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
