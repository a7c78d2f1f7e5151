//! Future-returning access to a logging backend
//!
//! Backends do blocking file I/O; this wrapper moves each call onto tokio's
//! blocking pool so async handlers can await it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::LoggerAdapter;
use crate::entry::{LogEntry, Severity};
use crate::error::{Error, Result};
use crate::query::QueryOptions;

/// Async counterpart of [`LoggerAdapter`]
#[async_trait]
pub trait AsyncLoggerAdapter: Send + Sync {
    async fn write(&self, level: Severity, entry: LogEntry) -> Result<()>;

    async fn info(&self, message: String) -> Result<()>;

    async fn error(&self, message: String) -> Result<()>;

    async fn query(&self, options: QueryOptions) -> Result<Vec<String>>;
}

/// Runs a blocking backend on the tokio blocking pool
#[derive(Clone)]
pub struct Nonblocking {
    inner: Arc<dyn LoggerAdapter>,
}

impl Nonblocking {
    pub fn new(inner: Arc<dyn LoggerAdapter>) -> Self {
        Self { inner }
    }

    /// Get the wrapped backend
    pub fn inner(&self) -> &Arc<dyn LoggerAdapter> {
        &self.inner
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LoggerAdapter) -> Result<T> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || f(inner.as_ref()))
            .await
            .map_err(|e| Error::adapter(format!("blocking log task failed: {}", e)))?
    }
}

#[async_trait]
impl AsyncLoggerAdapter for Nonblocking {
    async fn write(&self, level: Severity, entry: LogEntry) -> Result<()> {
        self.run(move |adapter| adapter.write(level, &entry)).await
    }

    async fn info(&self, message: String) -> Result<()> {
        self.run(move |adapter| adapter.info(&message)).await
    }

    async fn error(&self, message: String) -> Result<()> {
        self.run(move |adapter| adapter.error(&message)).await
    }

    async fn query(&self, options: QueryOptions) -> Result<Vec<String>> {
        self.run(move |adapter| adapter.query(&options)).await
    }
}
