use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::{DurableStore, StoreResult};
use crate::core::types::{CachedEntity, EntityId};

/// In-process durable store.
///
/// The reference collaborator for tests and embedding; "durable" only for
/// the lifetime of the process. Ids are assigned from a monotonic
/// sequence starting at 1.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<EntityId, String>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Number of rows currently stored
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl DurableStore for MemoryStore {
    async fn save(&self, entity: CachedEntity) -> StoreResult<CachedEntity> {
        let id = match entity.id {
            Some(id) => {
                // Keep the sequence ahead of explicit ids
                self.next_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        };

        self.rows.write().insert(id, entity.data.clone());
        debug!("store SAVE id={}", id);

        Ok(CachedEntity::with_id(id, entity.data))
    }

    async fn find_by_id(&self, id: EntityId) -> StoreResult<Option<CachedEntity>> {
        let found = self
            .rows
            .read()
            .get(&id)
            .map(|data| CachedEntity::with_id(id, data.clone()));
        debug!("store FIND id={}, found={}", id, found.is_some());
        Ok(found)
    }

    async fn exists_by_id(&self, id: EntityId) -> StoreResult<bool> {
        Ok(self.rows.read().contains_key(&id))
    }

    async fn delete_by_id(&self, id: EntityId) -> StoreResult<()> {
        let removed = self.rows.write().remove(&id);
        debug!("store DELETE id={}, existed={}", id, removed.is_some());
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        let mut rows = self.rows.write();
        debug!("store DELETE ALL ({} rows)", rows.len());
        rows.clear();
        Ok(())
    }
}
