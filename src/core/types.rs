use serde::{Deserialize, Serialize};

/// Identifier assigned by the durable store on first save.
pub type EntityId = u64;

/// The unit of caching: an opaque payload addressed by a store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntity {
    /// `None` until the durable store assigns an id on first save
    pub id: Option<EntityId>,
    /// Opaque payload, never interpreted by the cache
    pub data: String,
}

impl CachedEntity {
    /// Create a not-yet-persisted entity
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            id: None,
            data: data.into(),
        }
    }

    /// Create an entity with a known id (store-side use)
    pub fn with_id(id: EntityId, data: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            data: data.into(),
        }
    }
}

/// Statistics for the cache manager
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Number of PUT operations
    pub puts: u64,
    /// Number of GET operations
    pub gets: u64,
    /// DELETE operations that removed something (absent-id no-ops not counted)
    pub deletes: u64,
    /// GETs answered from memory
    pub hits: u64,
    /// GETs not answered from memory (whether or not the store had the id)
    pub misses: u64,
    /// Entries moved from memory to the durable store
    pub evictions: u64,
    /// Entries reloaded from the durable store into memory
    pub store_loads: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
