//! Per-key lock coordination.
//!
//! Each lockable key is a [`LockedEntry`]: the value behind a tokio
//! `RwLock`, plus the caller currently owning its write lock. The write
//! guard is an owned guard parked inside the entry, so it outlives the call
//! that acquired it and is dropped only when the owning request completes
//! (or when that same caller finishes a `set`).
//!
//! State machine per key:
//!
//! ```text
//! Unlocked --read--> ReadLocked(n) --last reader done--> Unlocked
//! Unlocked --write(c)--> WriteLocked(c) --release(c)--> Unlocked
//! WriteLocked(c) --write(c)--> WriteLocked(c)        (re-entry, no-op)
//! WriteLocked(c) --write(d)/read(d), d != c--> blocks until Unlocked
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use repsrv_types::{CallerId, Iri, Resource};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

/// A write lock parked on its entry, tagged with the caller that owns it.
struct WriteHold {
    caller: CallerId,
    guard: OwnedRwLockWriteGuard<Resource>,
}

/// One lockable key: a value, its lock, and the current write owner.
///
/// Invariant: `owner` is `Some(c)` exactly while `c` holds the write lock.
pub(crate) struct LockedEntry {
    id: Iri,
    value: Arc<RwLock<Resource>>,
    owner: Mutex<Option<WriteHold>>,
}

impl LockedEntry {
    pub(crate) fn new(id: Iri, value: Resource) -> Self {
        Self {
            id,
            value: Arc::new(RwLock::new(value)),
            owner: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> &Iri {
        &self.id
    }

    /// The caller currently owning the write lock, if any.
    pub(crate) fn write_owner(&self) -> Option<CallerId> {
        self.owner().as_ref().map(|hold| hold.caller)
    }

    /// Copy the value out under a shared lock.
    ///
    /// If `caller` already owns the write lock, the value is read through
    /// the parked guard instead; taking a read lock would wait on ourselves.
    pub(crate) async fn read(&self, caller: CallerId) -> Resource {
        if let Some(value) = self.with_owned(caller, |value| value.clone()) {
            return value;
        }
        self.value.read().await.clone()
    }

    /// Reserve the write lock for `caller` until it is released.
    ///
    /// Returns the current value and whether the lock was newly acquired
    /// (`false` means `caller` already owned it and nothing changed).
    pub(crate) async fn acquire(&self, caller: CallerId) -> (Resource, bool) {
        if let Some(value) = self.with_owned(caller, |value| value.clone()) {
            debug!(id = %self.id, %caller, "write lock re-entered");
            return (value, false);
        }
        debug!(id = %self.id, %caller, "locking");
        let guard = Arc::clone(&self.value).write_owned().await;
        let value = (*guard).clone();
        *self.owner() = Some(WriteHold { caller, guard });
        (value, true)
    }

    /// Apply `f` to the value as one complete transaction.
    ///
    /// Reuses the write lock if `caller` already owns it, otherwise waits
    /// for it. Either way the lock is released and the owner cleared before
    /// returning.
    pub(crate) async fn update<F>(&self, caller: CallerId, f: F)
    where
        F: FnOnce(&mut Resource),
    {
        let mut guard = match self.take_hold(caller) {
            Some(hold) => hold.guard,
            None => {
                debug!(id = %self.id, %caller, "locking");
                Arc::clone(&self.value).write_owned().await
            }
        };
        f(&mut *guard);
        drop(guard);
        debug!(id = %self.id, %caller, "unlocking");
    }

    /// Release the write lock if `caller` still owns it.
    pub(crate) fn release(&self, caller: CallerId) -> bool {
        match self.take_hold(caller) {
            Some(hold) => {
                drop(hold);
                debug!(id = %self.id, %caller, "unlocking");
                true
            }
            None => false,
        }
    }

    fn take_hold(&self, caller: CallerId) -> Option<WriteHold> {
        let mut owner = self.owner();
        match owner.as_ref() {
            Some(hold) if hold.caller == caller => owner.take(),
            _ => None,
        }
    }

    fn with_owned<R>(&self, caller: CallerId, f: impl FnOnce(&mut Resource) -> R) -> Option<R> {
        let mut owner = self.owner();
        match owner.as_mut() {
            Some(hold) if hold.caller == caller => Some(f(&mut *hold.guard)),
            _ => None,
        }
    }

    fn owner(&self) -> MutexGuard<'_, Option<WriteHold>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write locks currently parked on behalf of each caller.
///
/// Recorded when a write lock is acquired; drained when the caller's request
/// completes. Entries may be stale (the caller already released the lock
/// through `set`); release checks ownership, so stale records are harmless.
#[derive(Default)]
pub(crate) struct HoldRegistry {
    holds: Mutex<HashMap<CallerId, Vec<Arc<LockedEntry>>>>,
}

impl HoldRegistry {
    pub(crate) fn record(&self, caller: CallerId, entry: Arc<LockedEntry>) {
        self.holds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(caller)
            .or_default()
            .push(entry);
    }

    /// Release every write lock `caller` still owns. Returns how many were released.
    pub(crate) fn release_all(&self, caller: CallerId) -> usize {
        let entries = self
            .holds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&caller)
            .unwrap_or_default();
        entries.iter().filter(|entry| entry.release(caller)).count()
    }

    /// Number of callers with recorded holds.
    pub(crate) fn callers(&self) -> usize {
        self.holds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
