use thiserror::Error;

use crate::store::StoreError;

/// Main error type for cache operations
///
/// An absent id is not an error: `get` returns `Ok(None)` and `delete`
/// returns `Ok(false)` when nothing existed.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
