use std::sync::{Mutex, PoisonError};

use repsrv_types::CallerId;

/// Hands out a fresh [`CallerId`] for each inbound request.
///
/// A monotonically increasing counter behind a mutex: uniqueness is the
/// requirement, not unpredictability. Zero is never issued.
#[derive(Debug)]
pub(crate) struct CallerAllocator {
    next: Mutex<u64>,
}

impl CallerAllocator {
    pub(crate) fn new() -> Self {
        Self { next: Mutex::new(1) }
    }

    /// Allocate a token not held by any other request, live or finished.
    pub(crate) fn allocate(&self) -> CallerId {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let id = CallerId::from_raw(*next);
        *next += 1;
        id
    }
}

impl Default for CallerAllocator {
    fn default() -> Self {
        Self::new()
    }
}
