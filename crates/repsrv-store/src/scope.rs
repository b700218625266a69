use std::sync::Arc;

use repsrv_types::CallerId;
use tracing::trace;

use crate::store::ObjectStore;

/// The lifetime of one inbound request, as seen by the store.
///
/// Carries the request's [`CallerId`]. When the scope ends, whether through
/// [`RequestScope::complete`], an early return, a panic, or the request
/// future being dropped, every write lock still owned by that caller is
/// released. This is the only way a lock taken with
/// [`AccessMode::Write`](crate::AccessMode::Write) is released.
#[must_use = "dropping the scope immediately releases the request's write locks"]
pub struct RequestScope {
    store: Arc<ObjectStore>,
    caller: CallerId,
}

impl RequestScope {
    pub(crate) fn new(store: Arc<ObjectStore>, caller: CallerId) -> Self {
        trace!(%caller, "request scope opened");
        Self { store, caller }
    }

    /// The token to pass to every store call made for this request.
    pub fn caller(&self) -> CallerId {
        self.caller
    }

    pub fn store(&self) -> &Arc<ObjectStore> {
        &self.store
    }

    /// End the request explicitly.
    pub fn complete(self) {}
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.store.release(self.caller);
        trace!(caller = %self.caller, "request scope closed");
    }
}

impl std::fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScope")
            .field("caller", &self.caller)
            .finish()
    }
}
