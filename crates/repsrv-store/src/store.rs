use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use repsrv_types::{
    ActivityStreamsClassifier, CallerId, Iri, Resource, ResourceClassifier,
};
use serde_json::Value;
use tracing::debug;

use crate::caller::CallerAllocator;
use crate::error::{StoreError, StoreResult};
use crate::ids::IdGenerator;
use crate::lock::{HoldRegistry, LockedEntry};
use crate::mode::AccessMode;
use crate::scope::RequestScope;
use crate::well_known::{WellKnown, WellKnownIris, WellKnownTable};

/// Concurrent, identity-aware object store for one actor.
///
/// Holds the six well-known slots and a generic map from identifier to
/// entry. Every entry carries its own lock; the map itself has a separate
/// lock that only guards its key set, so reading or writing one entry never
/// blocks access to another.
///
/// Share it behind an `Arc` and open a [`RequestScope`] per inbound request
/// with [`ObjectStore::begin_request`].
pub struct ObjectStore {
    origin: Iri,
    ids: IdGenerator,
    callers: CallerAllocator,
    well_known: WellKnownTable,
    entries: RwLock<HashMap<Iri, Arc<LockedEntry>>>,
    holds: HoldRegistry,
    classifier: Arc<dyn ResourceClassifier>,
}

impl ObjectStore {
    /// Create a store for the server at `origin`, minting new identifiers
    /// under `new_path` and seeding the actor slot with `profile`.
    pub fn new(origin: &Iri, new_path: &str, profile: Resource) -> Self {
        Self::with_classifier(origin, new_path, profile, Arc::new(ActivityStreamsClassifier))
    }

    /// Like [`ObjectStore::new`] with a custom collection classifier.
    pub fn with_classifier(
        origin: &Iri,
        new_path: &str,
        profile: Resource,
        classifier: Arc<dyn ResourceClassifier>,
    ) -> Self {
        let origin = origin.with_path("/");
        let iris = WellKnownIris::new(&origin);
        Self {
            ids: IdGenerator::new(&origin, new_path),
            callers: CallerAllocator::new(),
            well_known: WellKnownTable::new(iris, profile),
            entries: RwLock::new(HashMap::new()),
            holds: HoldRegistry::default(),
            classifier,
            origin,
        }
    }

    /// The server origin every owned identifier shares.
    pub fn origin(&self) -> &Iri {
        &self.origin
    }

    pub fn well_known(&self) -> &WellKnownIris {
        self.well_known.iris()
    }

    /// Whether this server is authoritative for `id`.
    pub fn owns(&self, id: &Iri) -> bool {
        let owned = id.authority() == self.origin.authority();
        debug!(%id, owned, "owns");
        owned
    }

    /// Mint a fresh identifier for a new resource.
    pub fn next_id(&self) -> Iri {
        self.ids.next()
    }

    pub(crate) fn allocate_caller(&self) -> CallerId {
        self.callers.allocate()
    }

    /// Start a request: allocate its caller token and tie write-lock release
    /// to the returned scope.
    pub fn begin_request(self: &Arc<Self>) -> RequestScope {
        RequestScope::new(Arc::clone(self), self.allocate_caller())
    }

    /// True if `id` names a well-known slot or a stored entry.
    pub fn has(&self, id: &Iri) -> bool {
        let found = self.well_known.resolve(id).is_some() || self.entries().contains_key(id);
        debug!(%id, found, "has");
        found
    }

    /// Number of entries in the generic map (well-known slots excluded).
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a copy of the resource named by `id`.
    ///
    /// `Read` waits while another caller holds the write lock. `Write`
    /// reserves the key for `caller` until its request completes; if
    /// `caller` already holds it, the call returns immediately.
    pub async fn get(&self, id: &Iri, mode: AccessMode, caller: CallerId) -> StoreResult<Resource> {
        debug!(%id, %mode, %caller, "get");
        let entry = self
            .lookup(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        match mode {
            AccessMode::Read => Ok(entry.read(caller).await),
            AccessMode::Write => {
                let (value, acquired) = entry.acquire(caller).await;
                if acquired {
                    self.holds.record(caller, entry);
                }
                Ok(value)
            }
        }
    }

    /// Store `value` under `id` as one complete transaction.
    ///
    /// New identifiers are inserted unlocked. Existing ones are replaced
    /// under the write lock (reused if `caller` holds it), which is released
    /// before returning.
    pub async fn set(&self, id: &Iri, value: Resource, caller: CallerId) -> StoreResult<()> {
        debug!(%id, %caller, "set");
        let value_id = value.id().ok_or_else(|| {
            StoreError::InvalidArgument(format!("setting {id}: resource has no id"))
        })?;
        if &value_id != id {
            return Err(StoreError::InvalidArgument(format!(
                "setting {id}: resource carries id {value_id}"
            )));
        }

        if let Some((kind, slot)) = self.well_known.resolve(id) {
            let slot = Arc::clone(slot);
            return self.set_well_known(kind, &slot, value, caller).await;
        }

        let existing = {
            let mut entries = self.entries_mut();
            match entries.get(id) {
                Some(entry) => Arc::clone(entry),
                None => {
                    entries.insert(id.clone(), Arc::new(LockedEntry::new(id.clone(), value)));
                    debug!(%id, "inserted");
                    return Ok(());
                }
            }
        };
        existing.update(caller, |current| *current = value).await;
        Ok(())
    }

    async fn set_well_known(
        &self,
        kind: WellKnown,
        slot: &LockedEntry,
        value: Resource,
        caller: CallerId,
    ) -> StoreResult<()> {
        if kind.requires_ordered_collection() {
            if !self.classifier.is_ordered_collection(&value) {
                return Err(StoreError::TypeMismatch {
                    id: slot.id().clone(),
                    expected: "OrderedCollection",
                });
            }
            slot.update(caller, |current| *current = value).await;
            return Ok(());
        }

        // The profile itself is fixed; only its endpoint metadata may change.
        // An explicit null clears it, an absent field leaves it alone.
        let endpoints = value.property("endpoints").cloned();
        slot.update(caller, |profile| match endpoints {
            Some(Value::Null) => {
                profile.remove_property("endpoints");
            }
            Some(endpoints) => {
                profile.set_property("endpoints", endpoints);
            }
            None => {}
        })
        .await;
        Ok(())
    }

    /// Release every write lock `caller` still owns. Called when its
    /// request scope ends.
    pub(crate) fn release(&self, caller: CallerId) -> usize {
        let released = self.holds.release_all(caller);
        if released > 0 {
            debug!(%caller, released, "request complete, write locks released");
        }
        released
    }

    fn lookup(&self, id: &Iri) -> Option<Arc<LockedEntry>> {
        if let Some((_, slot)) = self.well_known.resolve(id) {
            return Some(Arc::clone(slot));
        }
        self.entries().get(id).cloned()
    }

    fn entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Iri, Arc<LockedEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Iri, Arc<LockedEntry>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("origin", &self.origin.as_str())
            .field("entry_count", &self.len())
            .field("callers_holding_locks", &self.holds.callers())
            .finish()
    }
}
