//! LFU cache manager
//!
//! Keeps hot entities in memory and falls through to a [`DurableStore`]
//! on miss (get) and on overflow (put). The store is the system of
//! record; the cache is a performance layer, never the source of truth.

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::{CacheError, Result};
use super::types::{CacheStats, CachedEntity, EntityId};
use crate::config::CacheConfig;
use crate::store::{DurableStore, StoreError};

/// The three in-memory structures, kept behind one lock so they can only
/// move together: the eviction order is defined in terms of the
/// frequency map, and updating one without the other would leave the
/// ordering undefined.
#[derive(Default)]
struct CacheState {
    /// Resident entities by id
    resident: HashMap<EntityId, String>,
    /// Access count per resident id, starts at 1, +1 per hit
    frequency: HashMap<EntityId, u64>,
    /// Eviction order: ascending (frequency, id). Every frequency change
    /// removes the old pair and inserts the new one in the same critical
    /// section, so a pair is stale only if that discipline is broken
    /// elsewhere; `peek_least_used` discards such pairs instead of
    /// evicting a phantom id.
    order: BTreeSet<(u64, EntityId)>,
}

impl CacheState {
    fn len(&self) -> usize {
        self.resident.len()
    }

    fn contains(&self, id: EntityId) -> bool {
        self.resident.contains_key(&id)
    }

    /// Insert a fresh entry with frequency 1
    fn insert(&mut self, id: EntityId, data: String) {
        self.resident.insert(id, data);
        self.frequency.insert(id, 1);
        self.order.insert((1, id));
    }

    /// Bump the access count of a resident id and reorder it
    fn touch(&mut self, id: EntityId) {
        if let Some(freq) = self.frequency.get_mut(&id) {
            self.order.remove(&(*freq, id));
            *freq += 1;
            self.order.insert((*freq, id));
        }
    }

    /// Overwrite the payload of a resident id; counts as an access
    fn overwrite(&mut self, id: EntityId, data: String) {
        self.resident.insert(id, data);
        self.touch(id);
    }

    /// Detach an id from all three structures
    fn remove(&mut self, id: EntityId) -> Option<String> {
        let data = self.resident.remove(&id)?;
        if let Some(freq) = self.frequency.remove(&id) {
            self.order.remove(&(freq, id));
        }
        Some(data)
    }

    /// Next eviction candidate: the live pair with the smallest
    /// (frequency, id). Stale pairs are discarded on the way, never
    /// returned. Ties resolve to the smallest id; FIFO-among-ties is an
    /// explicit non-requirement.
    fn peek_least_used(&mut self) -> Option<(EntityId, u64)> {
        while let Some(&(freq, id)) = self.order.first() {
            let live = self.frequency.get(&id) == Some(&freq) && self.resident.contains_key(&id);
            if live {
                return Some((id, freq));
            }
            self.order.remove(&(freq, id));
            debug!("Discarded stale eviction-order pair id={}, freq={}", id, freq);
        }
        None
    }

    fn clear(&mut self) {
        self.resident.clear();
        self.frequency.clear();
        self.order.clear();
    }
}

/// Shared, long-lived LFU cache over a durable store.
///
/// Concurrency contract: every public operation takes one internal
/// exclusive lock for its whole duration, store calls included. That
/// serializes reload/evict/delete races on the same id by construction;
/// callers needing more throughput should shard across managers rather
/// than reach into this one.
///
/// Eviction and deletion are distinct exits from residency: eviction
/// writes the entry back to the store and preserves the durable row,
/// deletion removes the row. Only `delete`/`clear_all` destroy data.
pub struct LfuCacheManager<S: DurableStore> {
    store: Arc<S>,
    max_entries: usize,
    state: Arc<Mutex<CacheState>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl<S: DurableStore> Clone for LfuCacheManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            max_entries: self.max_entries,
            state: Arc::clone(&self.state),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<S: DurableStore> LfuCacheManager<S> {
    /// Create a manager over `store` with the configured capacity
    pub fn new(store: S, config: CacheConfig) -> Self {
        let max_entries = config.max_entries.max(1);
        if config.max_entries == 0 {
            warn!("max_entries=0 is not satisfiable, clamping to 1");
        }
        info!("Initializing LFU cache with max_entries={}", max_entries);

        Self {
            store: Arc::new(store),
            max_entries,
            state: Arc::new(Mutex::new(CacheState::default())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Insert or update an entity.
    ///
    /// The store is written first: it assigns the id when unset, and every
    /// put is write-through. If the cache is full and the id is not
    /// already resident, the least frequently used entry is evicted
    /// before insertion. A store failure leaves memory exactly as it was.
    pub async fn put(&self, entity: CachedEntity) -> Result<CachedEntity> {
        if entity.data.is_empty() {
            return Err(CacheError::InvalidInput(
                "entity data cannot be empty".to_string(),
            ));
        }

        let mut state = self.state.lock().await;

        let saved = self.store.save(entity).await?;
        let id = saved.id.ok_or_else(|| {
            StoreError::Backend("save returned an entity without an id".to_string())
        })?;

        if state.contains(id) {
            state.overwrite(id, saved.data.clone());
            debug!("PUT update resident id={}", id);
        } else {
            if state.len() >= self.max_entries {
                self.evict_one(&mut state).await?;
            }
            state.insert(id, saved.data.clone());
            debug!("PUT insert id={}", id);
        }

        self.stats.write().puts += 1;
        Ok(saved)
    }

    /// Fetch an entity, from memory when resident, from the store
    /// otherwise. A store hit is loaded into the cache with frequency 1
    /// (reload counts as a fresh access) and may evict a different entry
    /// if the cache is already full. An id absent from both is `Ok(None)`.
    pub async fn get(&self, id: EntityId) -> Result<Option<CachedEntity>> {
        let mut state = self.state.lock().await;
        self.stats.write().gets += 1;

        if let Some(data) = state.resident.get(&id).cloned() {
            state.touch(id);
            self.stats.write().hits += 1;
            debug!("GET hit id={}", id);
            return Ok(Some(CachedEntity::with_id(id, data)));
        }

        self.stats.write().misses += 1;
        debug!("GET miss id={}, falling through to store", id);

        let Some(found) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        if state.len() >= self.max_entries {
            self.evict_one(&mut state).await?;
        }
        state.insert(id, found.data.clone());
        self.stats.write().store_loads += 1;

        Ok(Some(found))
    }

    /// Remove an entity from memory and from the store. Idempotent:
    /// deleting an absent id succeeds and returns `false`. The store
    /// delete is sequenced before the memory removal so a store failure
    /// leaves the cache untouched.
    pub async fn delete(&self, id: EntityId) -> Result<bool> {
        let mut state = self.state.lock().await;

        let resident = state.contains(id);
        let existed = resident || self.store.exists_by_id(id).await?;

        self.store.delete_by_id(id).await?;
        if resident {
            state.remove(id);
        }

        if existed {
            self.stats.write().deletes += 1;
            info!("Removed id={} from cache and durable store", id);
        } else {
            debug!("DELETE id={} found nothing to remove", id);
        }
        Ok(existed)
    }

    /// Destroy every entity in memory AND in the store. Irreversible.
    pub async fn clear_all(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        self.store.delete_all().await?;
        state.clear();

        info!("Removed all entities from cache and durable store");
        Ok(())
    }

    /// Drop every resident entry without touching the store. Entries
    /// stay retrievable via `get`, which reloads them with frequency 1.
    pub async fn clear_cache(&self) {
        let mut state = self.state.lock().await;
        let count = state.len();
        state.clear();
        info!("Cleared the cache ({} resident entries)", count);
    }

    /// Number of resident entries. Never touches the store.
    pub async fn size(&self) -> usize {
        self.state.lock().await.len()
    }

    /// Residency peek: no frequency bump, no store access
    pub async fn contains(&self, id: EntityId) -> bool {
        self.state.lock().await.contains(id)
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    /// The durable store this cache delegates to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evict the least frequently used resident entry: write it back to
    /// the store, then detach it. Write-back is required even though puts
    /// are write-through, because get-triggered loads and frequency-only
    /// updates are never separately flushed.
    async fn evict_one(&self, state: &mut CacheState) -> Result<()> {
        let Some((victim, freq)) = state.peek_least_used() else {
            warn!("Eviction requested but no live candidate found");
            return Ok(());
        };

        if let Some(data) = state.resident.get(&victim).cloned() {
            self.store.save(CachedEntity::with_id(victim, data)).await?;
            state.remove(victim);
            self.stats.write().evictions += 1;
            info!("Evicted id={} (freq={}) from cache to durable store", victim, freq);
        }
        Ok(())
    }
}
