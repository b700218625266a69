use std::fmt;
use std::sync::Arc;

use repsrv_types::{Iri, Resource};
use serde::{Deserialize, Serialize};

use crate::lock::LockedEntry;

/// The actor profile and its collections, each stored in a dedicated slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellKnown {
    Actor,
    Inbox,
    Outbox,
    Following,
    Followers,
    Liked,
}

impl WellKnown {
    /// Every well-known slot, in slot order.
    pub const ALL: [WellKnown; 6] = [
        WellKnown::Actor,
        WellKnown::Inbox,
        WellKnown::Outbox,
        WellKnown::Following,
        WellKnown::Followers,
        WellKnown::Liked,
    ];

    /// Fixed path of the slot on this server.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Actor => "/actor",
            Self::Inbox => "/actor/inbox",
            Self::Outbox => "/actor/outbox",
            Self::Following => "/actor/following",
            Self::Followers => "/actor/followers",
            Self::Liked => "/actor/liked",
        }
    }

    /// Collection slots only accept ordered collections; the actor slot
    /// holds a profile.
    pub const fn requires_ordered_collection(self) -> bool {
        !matches!(self, Self::Actor)
    }

    /// The profile property pointing at this collection.
    pub const fn profile_property(self) -> Option<&'static str> {
        match self {
            Self::Actor => None,
            Self::Inbox => Some("inbox"),
            Self::Outbox => Some("outbox"),
            Self::Following => Some("following"),
            Self::Followers => Some("followers"),
            Self::Liked => Some("liked"),
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Actor => 0,
            Self::Inbox => 1,
            Self::Outbox => 2,
            Self::Following => 3,
            Self::Followers => 4,
            Self::Liked => 5,
        }
    }
}

impl fmt::Display for WellKnown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Actor => "actor",
            Self::Inbox => "inbox",
            Self::Outbox => "outbox",
            Self::Following => "following",
            Self::Followers => "followers",
            Self::Liked => "liked",
        };
        f.write_str(name)
    }
}

/// The six well-known identifiers for one server origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownIris {
    iris: [Iri; 6],
}

impl WellKnownIris {
    /// Derive the identifiers from the server origin (scheme + authority).
    pub fn new(origin: &Iri) -> Self {
        Self {
            iris: WellKnown::ALL.map(|kind| origin.with_path(kind.path())),
        }
    }

    pub fn get(&self, kind: WellKnown) -> &Iri {
        &self.iris[kind.index()]
    }

    pub fn actor(&self) -> &Iri {
        self.get(WellKnown::Actor)
    }

    pub fn inbox(&self) -> &Iri {
        self.get(WellKnown::Inbox)
    }

    pub fn outbox(&self) -> &Iri {
        self.get(WellKnown::Outbox)
    }

    /// Which slot, if any, `id` names.
    pub fn resolve(&self, id: &Iri) -> Option<WellKnown> {
        WellKnown::ALL
            .into_iter()
            .find(|kind| self.get(*kind) == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (WellKnown, &Iri)> {
        WellKnown::ALL.into_iter().zip(self.iris.iter())
    }
}

/// The dedicated slots, consulted before the generic map.
pub(crate) struct WellKnownTable {
    iris: WellKnownIris,
    slots: [Arc<LockedEntry>; 6],
}

impl WellKnownTable {
    /// Seed the actor slot with `profile` and every collection slot with an
    /// empty ordered collection.
    pub(crate) fn new(iris: WellKnownIris, profile: Resource) -> Self {
        let slots = WellKnown::ALL.map(|kind| {
            let id = iris.get(kind).clone();
            let value = match kind {
                WellKnown::Actor => profile.clone().with_id(&id),
                _ => Resource::ordered_collection(&id),
            };
            Arc::new(LockedEntry::new(id, value))
        });
        Self { iris, slots }
    }

    pub(crate) fn iris(&self) -> &WellKnownIris {
        &self.iris
    }

    pub(crate) fn resolve(&self, id: &Iri) -> Option<(WellKnown, &Arc<LockedEntry>)> {
        self.iris
            .resolve(id)
            .map(|kind| (kind, &self.slots[kind.index()]))
    }
}
