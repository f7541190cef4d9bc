/// Domain-level errors surfaced by the service layer and its callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Failure reported by an [`ItemStore`](crate::store::ItemStore) implementation.
///
/// Store implementations classify their native errors into these variants;
/// the service passes them through untouched.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// A schema constraint rejected the write (length, not-null, check, ...).
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The backing store could not be reached or ran out of connections.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("Store failure: {0}")]
    Backend(String),
}

/// Result alias for store and service calls.
pub type StoreResult<T> = Result<T, PersistenceError>;
