use thiserror::Error;

/// Failures surfaced by store operations
///
/// Authorization and caller mistakes are returned to the caller. Environmental
/// failures that a store can recover from are recorded in its `error` field
/// instead and never reach this type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User is not authenticated")]
    Unauthenticated,
    #[error("Access denied")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    /// Recover a store error raised inside a storage closure; anything else
    /// is a storage failure
    pub fn from_storage(error: anyhow::Error) -> Self {
        match error.downcast::<StoreError>() {
            Ok(store_error) => store_error,
            Err(error) => StoreError::Storage(error),
        }
    }
}


pub type StoreResult<T> = Result<T, StoreError>;
