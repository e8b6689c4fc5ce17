pub mod config;
pub mod core;
pub mod store;

// Re-export commonly used types
pub use crate::config::CacheConfig;
pub use crate::core::{CacheError, CacheStats, CachedEntity, EntityId, LfuCacheManager, Result};
pub use crate::store::{DurableStore, FileStore, MemoryStore, StoreError};
