use std::sync::Arc;

use repsrv_store::ObjectStore;
use repsrv_types::Iri;

use crate::auth::{PermissiveVerifier, Verifier};
use crate::clock::{Clock, LocalClock};
use crate::delivery::{Deliverer, SyncDeliverer};
use crate::hooks::{Callbacker, NothingCallbacker};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ObjectStore>,
    pub verifier: Arc<dyn Verifier>,
    pub clock: Arc<dyn Clock>,
    pub deliverer: Arc<dyn Deliverer>,
    pub callbacker: Arc<dyn Callbacker>,
}

impl AppState {
    /// State with the permissive verifier, the local clock, the synchronous
    /// deliverer, and a callbacker that accepts everything.
    pub fn new(store: Arc<ObjectStore>) -> Self {
        let iris = store.well_known();
        let verifier = PermissiveVerifier::new(iris.actor().clone(), iris.outbox().clone());
        Self {
            verifier: Arc::new(verifier),
            clock: Arc::new(LocalClock),
            deliverer: Arc::new(SyncDeliverer::new()),
            callbacker: Arc::new(NothingCallbacker),
            store,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_deliverer(mut self, deliverer: Arc<dyn Deliverer>) -> Self {
        self.deliverer = deliverer;
        self
    }

    pub fn with_callbacker(mut self, callbacker: Arc<dyn Callbacker>) -> Self {
        self.callbacker = callbacker;
        self
    }

    /// The identifier a request path names on this server. The configured
    /// origin wins over whatever `Host` the client sent.
    pub fn request_iri(&self, path: &str) -> Iri {
        self.store.origin().with_path(path)
    }
}
