use crate::resource::Resource;

/// Capability checks the store needs before accepting a write into one of
/// the well-known collection slots.
///
/// The store never inspects resources otherwise; swapping the classifier
/// changes what counts as a collection without touching the locking code.
pub trait ResourceClassifier: Send + Sync {
    /// Returns `true` if the value can stand in for an inbox, outbox, or
    /// one of the actor's relationship collections.
    fn is_ordered_collection(&self, resource: &Resource) -> bool;
}

/// Classifies by the ActivityStreams `type` property.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivityStreamsClassifier;

impl ActivityStreamsClassifier {
    const ORDERED_COLLECTION_TYPES: [&'static str; 2] =
        ["OrderedCollection", "OrderedCollectionPage"];
}

impl ResourceClassifier for ActivityStreamsClassifier {
    fn is_ordered_collection(&self, resource: &Resource) -> bool {
        resource
            .kinds()
            .iter()
            .any(|kind| Self::ORDERED_COLLECTION_TYPES.contains(kind))
    }
}
