//! Configuration for the log store
//!
//! This module provides configuration options for the bucket directory, the
//! result cache and the query defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default directory holding the bucket files
pub const DEFAULT_LOG_DIRECTORY: &str = "./logs/";

/// Configuration options for a log store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct StoreConfig {
    // Storage configuration
    /// Directory holding one file per (day, severity)
    pub directory: PathBuf,
    /// Whether to sync every appended line to disk
    pub sync_writes: bool,

    // Cache configuration
    /// Seconds a cached query result stays fresh
    pub cache_ttl_secs: u64,

    // Query settings
    /// Number of entries returned when the caller does not ask for a size
    pub default_query_size: usize,
    /// Days before `until` used when the caller does not give `from`
    pub default_lookback_days: u32,
    /// Whether bucket files of one query are read in parallel
    pub parallel_reads: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            sync_writes: false,
            cache_ttl_secs: 60,
            default_query_size: 10,
            default_lookback_days: 7,
            parallel_reads: true,
        }
    }
}

impl StoreConfig {
    /// Create a new store configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket directory
    pub fn with_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.directory = path.as_ref().to_path_buf();
        self
    }

    /// Set whether to sync writes to disk immediately
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Set the cache freshness threshold in seconds
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Set the default number of entries per query
    pub fn with_default_query_size(mut self, size: usize) -> Self {
        self.default_query_size = size;
        self
    }

    /// Set the default lookback in days
    pub fn with_default_lookback_days(mut self, days: u32) -> Self {
        self.default_lookback_days = days;
        self
    }

    /// Set whether bucket reads run in parallel
    pub fn with_parallel_reads(mut self, parallel: bool) -> Self {
        self.parallel_reads = parallel;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(Error::config("Log directory must not be empty"));
        }

        if self.cache_ttl_secs < 1 {
            return Err(Error::config("Cache TTL must be at least 1 second"));
        }

        if self.default_query_size < 1 {
            return Err(Error::config("Default query size must be at least 1"));
        }

        if self.default_lookback_days < 1 {
            return Err(Error::config("Default lookback must be at least 1 day"));
        }

        Ok(())
    }

    /// Get the cache freshness threshold
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }

    /// Get the default lookback window
    pub fn default_lookback(&self) -> chrono::Duration {
        chrono::Duration::days(self.default_lookback_days as i64)
    }

    /// Create a human-readable string representation of the configuration
    pub fn to_string_pretty(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Log Store Configuration ===\n\n");

        result.push_str("Storage Configuration:\n");
        result.push_str(&format!("  Directory: {:?}\n", self.directory));
        result.push_str(&format!("  Sync Writes: {}\n", self.sync_writes));

        result.push_str("\nCache Settings:\n");
        result.push_str(&format!("  Cache TTL: {} seconds\n", self.cache_ttl_secs));

        result.push_str("\nQuery Settings:\n");
        result.push_str(&format!("  Default Query Size: {}\n", self.default_query_size));
        result.push_str(&format!("  Default Lookback: {} days\n", self.default_lookback_days));
        result.push_str(&format!("  Parallel Reads: {}\n", self.parallel_reads));

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();

        assert_eq!(config.directory, PathBuf::from("./logs/"));
        assert!(!config.sync_writes);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.cache_ttl(), chrono::Duration::seconds(60));
        assert_eq!(config.default_query_size, 10);
        assert_eq!(config.default_lookback(), chrono::Duration::days(7));
        assert!(config.parallel_reads);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new()
            .with_directory("/tmp/bucketlog")
            .with_sync_writes(true)
            .with_cache_ttl_secs(5)
            .with_default_query_size(50)
            .with_default_lookback_days(1)
            .with_parallel_reads(false);

        assert_eq!(config.directory, PathBuf::from("/tmp/bucketlog"));
        assert!(config.sync_writes);
        assert_eq!(config.cache_ttl_secs, 5);
        assert_eq!(config.default_query_size, 50);
        assert_eq!(config.default_lookback_days, 1);
        assert!(!config.parallel_reads);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let invalid_configs = vec![
            StoreConfig::new().with_directory(""),
            StoreConfig::new().with_cache_ttl_secs(0),
            StoreConfig::new().with_default_query_size(0),
            StoreConfig::new().with_default_lookback_days(0),
        ];

        for config in invalid_configs {
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_config_serde() {
        let config = StoreConfig::new().with_cache_ttl_secs(30);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_pretty_string() {
        let pretty = StoreConfig::new().to_string_pretty();

        assert!(pretty.contains("Storage Configuration:"));
        assert!(pretty.contains("Cache TTL: 60 seconds"));
        assert!(pretty.contains("Default Query Size: 10"));
    }
}
