//! Pluggable logging backend
//!
//! Collaborators such as the logs route depend only on [`LoggerAdapter`]. One
//! implementation is bound per [`AdapterRegistry`]; when none is bound, the
//! registry opens a [`FileLogStore`] on first use.

use std::sync::{Arc, OnceLock};

use chrono::Utc;

use crate::config::StoreConfig;
use crate::entry::{LogEntry, Severity};
use crate::error::{Error, Result};
use crate::query::QueryOptions;
use crate::store::FileLogStore;

/// Operations every logging backend provides
pub trait LoggerAdapter: Send + Sync {
    /// Get a short name identifying the backend
    fn name(&self) -> &str;

    /// Persist an entry under `level`
    fn write(&self, level: Severity, entry: &LogEntry) -> Result<()>;

    /// Return at most `size` raw entries matching the options
    fn query(&self, options: &QueryOptions) -> Result<Vec<String>>;

    /// Write an info entry stamped with the current time
    fn info(&self, message: &str) -> Result<()> {
        self.write(Severity::Info, &LogEntry::new(Severity::Info, message, Utc::now()))
    }

    /// Write an error entry stamped with the current time
    fn error(&self, message: &str) -> Result<()> {
        self.write(Severity::Error, &LogEntry::new(Severity::Error, message, Utc::now()))
    }
}

impl LoggerAdapter for FileLogStore {
    fn name(&self) -> &str {
        "file_buckets"
    }

    fn write(&self, level: Severity, entry: &LogEntry) -> Result<()> {
        FileLogStore::write(self, level, entry)
    }

    fn query(&self, options: &QueryOptions) -> Result<Vec<String>> {
        Ok(FileLogStore::query(self, options))
    }

    fn info(&self, message: &str) -> Result<()> {
        FileLogStore::info(self, message)
    }

    fn error(&self, message: &str) -> Result<()> {
        FileLogStore::error(self, message)
    }
}

/// Holds the backend bound for the lifetime of the process
pub struct AdapterRegistry {
    adapter: OnceLock<Arc<dyn LoggerAdapter>>,
    default_config: StoreConfig,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterRegistry {
    /// Create a registry whose default backend uses the default configuration
    pub fn new() -> Self {
        Self::with_default_config(StoreConfig::default())
    }

    /// Create a registry whose default backend uses `config`
    pub fn with_default_config(config: StoreConfig) -> Self {
        Self {
            adapter: OnceLock::new(),
            default_config: config,
        }
    }

    /// Bind a backend; fails if one is already bound
    pub fn set_adapter(&self, adapter: Arc<dyn LoggerAdapter>) -> Result<()> {
        self.adapter.set(adapter).map_err(|rejected| {
            let bound = self.adapter.get().map(|a| a.name().to_string()).unwrap_or_default();
            Error::adapter(format!(
                "cannot bind {}: {} is already bound",
                rejected.name(),
                bound
            ))
        })
    }

    /// Get the bound backend, opening the default store if nothing is bound yet
    pub fn adapter(&self) -> Result<Arc<dyn LoggerAdapter>> {
        if let Some(adapter) = self.adapter.get() {
            return Ok(adapter.clone());
        }

        let store: Arc<dyn LoggerAdapter> = Arc::new(FileLogStore::with_config(self.default_config.clone())?);
        // A concurrent caller may have bound first; whichever won is returned.
        let _ = self.adapter.set(store);
        self.adapter
            .get()
            .cloned()
            .ok_or_else(|| Error::adapter("no backend bound"))
    }

    /// Check whether a backend is bound
    pub fn is_bound(&self) -> bool {
        self.adapter.get().is_some()
    }
}
