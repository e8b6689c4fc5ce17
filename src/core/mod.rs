pub mod error;
pub mod manager;
pub mod types;

pub use error::{CacheError, Result};
pub use manager::LfuCacheManager;
pub use types::{CacheStats, CachedEntity, EntityId};
