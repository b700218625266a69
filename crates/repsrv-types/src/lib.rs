//! Foundation types for the single-actor report server.
//!
//! Every other `repsrv` crate depends on `repsrv-types`.
//!
//! # Key Types
//!
//! - [`Iri`] -- absolute identifier naming a resource
//! - [`CallerId`] -- per-request token used for lock re-entry detection
//! - [`Resource`] -- opaque JSON object keyed by its `id`
//! - [`ResourceClassifier`] -- capability check for ordered collections

pub mod caller;
pub mod classify;
pub mod error;
pub mod iri;
pub mod resource;

pub use caller::CallerId;
pub use classify::{ActivityStreamsClassifier, ResourceClassifier};
pub use error::TypeError;
pub use iri::Iri;
pub use resource::Resource;
