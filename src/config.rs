use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Reference default for the resident-entry capacity
pub const DEFAULT_MAX_ENTRIES: usize = 5;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of resident entries before eviction kicks in
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CacheConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// A zero-capacity cache cannot hold its capacity invariant
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.max_entries >= 1, "max_entries must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(CacheConfig::default().max_entries, 5);
    }

    #[test]
    fn test_yaml_missing_field_uses_default() {
        let config: CacheConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.max_entries, 5);
    }

    #[test]
    fn test_yaml_overrides_capacity() {
        let config: CacheConfig = serde_yaml::from_str("max_entries: 12").unwrap();
        assert_eq!(config.max_entries, 12);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = CacheConfig { max_entries: 0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.yml");
        fs::write(&path, "max_entries: 7\n").unwrap();

        let config = CacheConfig::from_file(&path).unwrap();
        assert_eq!(config.max_entries, 7);
    }

    #[test]
    fn test_from_file_rejects_zero_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.yml");
        fs::write(&path, "max_entries: 0\n").unwrap();

        assert!(CacheConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_from_file_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CacheConfig::from_file(dir.path().join("absent.yml")).is_err());
    }
}
