use async_trait::async_trait;
use repsrv_types::Iri;
use tracing::{info, warn};

/// Hands a serialized activity to a remote recipient.
///
/// Failures are the deliverer's to handle; callers never see them.
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn deliver(&self, payload: &[u8], to: &Iri);
}

/// Attempts each delivery immediately, once, with no retry or backoff.
///
/// No network transport is wired in: an attempt is recorded in the log
/// and counted. Empty payloads are refused.
#[derive(Debug, Default)]
pub struct SyncDeliverer {
    attempted: std::sync::atomic::AtomicUsize,
}

impl SyncDeliverer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempted(&self) -> usize {
        self.attempted.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[async_trait]
impl Deliverer for SyncDeliverer {
    async fn deliver(&self, payload: &[u8], to: &Iri) {
        if payload.is_empty() {
            warn!(%to, "refusing to deliver empty payload");
            return;
        }
        self.attempted
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        info!(%to, bytes = payload.len(), "delivering");
    }
}
