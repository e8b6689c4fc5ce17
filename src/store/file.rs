use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{DurableStore, StoreError, StoreResult};
use crate::core::types::{CachedEntity, EntityId};

/// On-disk image of the whole store: id sequence plus every row.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    next_id: EntityId,
    rows: HashMap<EntityId, String>,
}

/// File-backed durable store.
///
/// Keeps all rows in memory and rewrites a bincode snapshot of the whole
/// state on every mutation (temp file + rename, so a crash mid-write
/// leaves the previous snapshot intact). Row count is expected to stay
/// small; this is a system of record for cache overflow, not a database.
pub struct FileStore {
    path: PathBuf,
    state: RwLock<StoreSnapshot>,
}

impl FileStore {
    /// Open a store at `path`, loading the existing snapshot if present
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let (snapshot, _) =
                    bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                snapshot
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(e) => return Err(e.into()),
        };

        info!("Opened file store at {:?}", path);
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Rewrite the snapshot file from the given state
    async fn persist(&self, state: &StoreSnapshot) -> StoreResult<()> {
        let bytes = bincode::serde::encode_to_vec(state, bincode::config::standard())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("store snapshot written ({} rows)", state.rows.len());
        Ok(())
    }
}

impl DurableStore for FileStore {
    async fn save(&self, entity: CachedEntity) -> StoreResult<CachedEntity> {
        let mut state = self.state.write().await;

        let id = match entity.id {
            Some(id) => {
                // Keep the sequence ahead of explicit ids
                state.next_id = state.next_id.max(id);
                id
            }
            None => {
                state.next_id += 1;
                state.next_id
            }
        };

        state.rows.insert(id, entity.data.clone());
        self.persist(&state).await?;

        Ok(CachedEntity::with_id(id, entity.data))
    }

    async fn find_by_id(&self, id: EntityId) -> StoreResult<Option<CachedEntity>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .get(&id)
            .map(|data| CachedEntity::with_id(id, data.clone())))
    }

    async fn exists_by_id(&self, id: EntityId) -> StoreResult<bool> {
        Ok(self.state.read().await.rows.contains_key(&id))
    }

    async fn delete_by_id(&self, id: EntityId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.rows.remove(&id).is_some() {
            self.persist(&state).await?;
        }
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.rows.clear();
        self.persist(&state).await
    }
}
