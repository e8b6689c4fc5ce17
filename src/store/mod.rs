//! Durable store collaborators
//!
//! The cache treats the store as the system of record: every entry not
//! currently resident in memory lives here, and ids are assigned here.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;
use thiserror::Error;

use crate::core::types::{CachedEntity, EntityId};

/// Errors surfaced by a durable store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("store data corrupt: {0}")]
    Corrupt(String),

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-value system of record keyed by [`EntityId`].
///
/// Implementations may block on I/O; the cache awaits these calls while
/// holding its state lock, so per-id operations are serialized for free.
pub trait DurableStore: Send + Sync {
    /// Persist an entity, assigning an id if it has none. Upserts when the
    /// id is already known.
    fn save(&self, entity: CachedEntity) -> impl Future<Output = StoreResult<CachedEntity>> + Send;

    /// Fetch an entity by id, `None` when the row does not exist
    fn find_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = StoreResult<Option<CachedEntity>>> + Send;

    /// Whether a row exists for this id
    fn exists_by_id(&self, id: EntityId) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Delete a row. Deleting an absent id is not an error.
    fn delete_by_id(&self, id: EntityId) -> impl Future<Output = StoreResult<()>> + Send;

    /// Delete every row
    fn delete_all(&self) -> impl Future<Output = StoreResult<()>> + Send;
}
