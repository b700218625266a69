use repsrv_types::Iri;

/// Errors from object store operations.
///
/// Every failure leaves the store unchanged; operations are single-key and
/// atomic with respect to that key's lock.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The identifier names neither a well-known slot nor a stored entry.
    #[error("{0} not found")]
    NotFound(Iri),

    /// The value cannot be written as given (e.g. it carries no id).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An access mode other than read or write was requested.
    #[error("unrecognized access mode: {0:?}")]
    InvalidMode(String),

    /// A well-known slot was written with a value lacking the capability
    /// the slot requires.
    #[error("setting {id} but not an {expected}")]
    TypeMismatch { id: Iri, expected: &'static str },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
