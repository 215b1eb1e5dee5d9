//! Error types

mod column;
mod fetch;
mod store;
mod validation;

pub use column::*;
pub use fetch::*;
pub use store::*;
pub use validation::*;

/// Any error surfaced by a table controller operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The fetch adapter failed. Previously loaded state is kept.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A filter value was rejected by a registered validator.
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldValidationError),

    /// A column operation was rejected.
    #[error(transparent)]
    Column(#[from] ColumnError),

    /// Column layout persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Returns `true` if re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            _ => false,
        }
    }
}
