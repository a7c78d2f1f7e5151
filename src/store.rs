use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::bucket::{list_bucket_files, BucketFile, BucketWriter};
use crate::cache::{CacheEntry, ResultCache};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::entry::{LogEntry, Severity};
use crate::error::{Error, Result};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::query::{QueryOptions, RangeQuery};

/// The default file-backed log store
///
/// Writes go to one append-only file per day and severity; queries read the
/// files overlapping the requested window and keep the last result in a
/// single-slot cache.
pub struct FileLogStore {
    /// Store configuration
    config: StoreConfig,
    /// Time source for rotation, cache age and query defaults
    clock: Arc<dyn Clock>,
    /// Append path
    writer: BucketWriter,
    /// Last query result
    cache: ResultCache,
    /// Metrics collector
    metrics: Arc<MetricsCollector>,
}

impl FileLogStore {
    /// Open a store in `dir` with default configuration
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::with_config(StoreConfig::new().with_directory(dir))
    }

    /// Open a store with custom configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Open a store with custom configuration and time source
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.directory).map_err(|e| {
            Error::storage(&config.directory, format!("Failed to create directory: {}", e))
        })?;

        let metrics = Arc::new(MetricsCollector::new());
        let writer = BucketWriter::new(
            config.directory.clone(),
            config.sync_writes,
            clock.clone(),
            metrics.clone(),
        );
        let cache = ResultCache::new(config.cache_ttl());

        Ok(Self {
            config,
            clock,
            writer,
            cache,
            metrics,
        })
    }

    /// Append an entry to today's bucket of `level`
    ///
    /// The entry must carry the same level it is written under.
    pub fn write(&self, level: Severity, entry: &LogEntry) -> Result<()> {
        if entry.level != level {
            return Err(Error::invalid_level(format!(
                "entry level {} written as {}",
                entry.level, level
            )));
        }

        let line = entry.to_line()?;
        self.writer.append(level, &line)
    }

    /// Write an info entry stamped with the current time
    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        let entry = LogEntry::new(Severity::Info, message, self.clock.now());
        self.write(Severity::Info, &entry)
    }

    /// Write an error entry stamped with the current time
    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        let entry = LogEntry::new(Severity::Error, message, self.clock.now());
        self.write(Severity::Error, &entry)
    }

    /// Return at most `size` stored lines of `level` whose timestamp lies in the window
    ///
    /// Unreadable bucket files and malformed lines are skipped; the result carries no
    /// marker of such omissions. A result cached for the same day-rounded window and
    /// level within the freshness threshold is reused, reversed if the order differs.
    pub fn query(&self, options: &QueryOptions) -> Vec<String> {
        let start = Instant::now();
        let now = self.clock.now();
        let query = options.resolve(now, &self.config);

        if query.is_empty_window() {
            self.metrics.record_query(start.elapsed(), 0);
            return Vec::new();
        }

        let key = query.cache_key();
        let results: Vec<String> = match self.cache.lookup(&key, now) {
            Some(cached) => {
                debug!(from = %key.from_bucket, until = %key.until_bucket, level = %key.level, "query cache hit");
                self.metrics.increment_cache_hits();
                cached
                    .lines_in(query.order)
                    .filter(|line| query.range.contains(&line.timestamp))
                    .take(query.size)
                    .map(|line| line.raw.clone())
                    .collect()
            }
            None => {
                debug!(from = %key.from_bucket, until = %key.until_bucket, level = %key.level, "query cache miss");
                self.metrics.increment_cache_misses();
                let assembled = RangeQuery::new(&self.config.directory, self.config.parallel_reads, &self.metrics)
                    .assemble(&query.range, query.level, query.order);

                let results = assembled
                    .iter()
                    .take(query.size)
                    .map(|line| line.raw.clone())
                    .collect();

                self.cache.store(CacheEntry {
                    captured_at: self.clock.now(),
                    key,
                    order: query.order,
                    data: Arc::new(assembled),
                });

                results
            }
        };

        self.metrics.record_query(start.elapsed(), results.len());
        results
    }

    /// Like [`query`](Self::query), decoding each returned line
    pub fn query_entries(&self, options: &QueryOptions) -> Vec<LogEntry> {
        self.query(options)
            .iter()
            .filter_map(|line| LogEntry::from_line(line).ok())
            .collect()
    }

    /// List the bucket files currently on disk
    pub fn bucket_files(&self) -> Result<Vec<BucketFile>> {
        list_bucket_files(&self.config.directory)
    }

    /// Drop the cached query result
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Get a snapshot of the store metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
