//! In-memory object store for the single-actor report server.
//!
//! Many requests read and mutate resources concurrently. Write access is
//! scoped to a request: a write lock taken through [`ObjectStore::get`] with
//! [`AccessMode::Write`] stays held until the owning [`RequestScope`]
//! completes, and the same request may re-enter it any number of times.
//!
//! # Components
//!
//! - [`IdGenerator`] -- mints fresh, never-reused resource identifiers
//! - [`WellKnown`] / [`WellKnownIris`] -- the actor profile and its five collections,
//!   stored in dedicated slots outside the generic map
//! - [`ObjectStore`] -- the generic map plus the slots, behind one API
//! - [`RequestScope`] -- the only way to obtain a caller token; ends the request's locks
//!
//! # Design Rules
//!
//! 1. Lookups resolve well-known slots before the generic map.
//! 2. A write lock on a key is owned by at most one caller at a time.
//! 3. Write locks are released only when the owning request completes.
//! 4. `set` is a complete transaction: it never leaves a lock behind.
//! 5. Nothing is persisted beyond the process lifetime.

mod caller;
pub mod error;
pub mod ids;
mod lock;
pub mod mode;
pub mod scope;
pub mod store;
pub mod well_known;

pub use error::{StoreError, StoreResult};
pub use ids::IdGenerator;
pub use mode::AccessMode;
pub use scope::RequestScope;
pub use store::ObjectStore;
pub use well_known::{WellKnown, WellKnownIris};
