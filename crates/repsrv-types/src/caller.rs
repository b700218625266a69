use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token naming one in-flight request.
///
/// Two store calls carrying the same `CallerId` belong to the same logical
/// request; the store uses this to let a request re-enter a write lock it
/// already holds instead of deadlocking on it. Tokens are never reused while
/// the process lives.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallerId(u64);

impl CallerId {
    /// Create from a raw counter value. Production code should obtain
    /// tokens from the store's caller allocator instead.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallerId({})", self.0)
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caller#{}", self.0)
    }
}
