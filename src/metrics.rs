use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Performance metrics collector for the log store
#[derive(Debug)]
pub struct MetricsCollector {
    // Write path
    /// Number of appended entries
    write_count: AtomicUsize,
    /// Total bytes appended, line terminators included
    bytes_written: AtomicUsize,
    /// Number of day rotations
    rotation_count: AtomicUsize,

    // Query path
    /// Number of query operations
    query_count: AtomicUsize,
    /// Total number of entries returned to callers
    query_result_count: AtomicUsize,
    /// Total query duration in nanoseconds
    query_duration_ns: AtomicU64,
    /// Number of bucket files read successfully
    buckets_read: AtomicUsize,
    /// Number of selected buckets with no file
    buckets_missing: AtomicUsize,
    /// Number of bucket files that existed but failed to read
    bucket_read_failures: AtomicUsize,
    /// Number of stored lines dropped because they did not decode
    malformed_lines: AtomicUsize,

    // Cache metrics
    /// Number of cache hits
    cache_hits: AtomicUsize,
    /// Number of cache misses
    cache_misses: AtomicUsize,

    // Internal state
    /// Start time of the metrics collector
    start_time: Instant,
}

/// Point-in-time copy of the collected metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub write_count: usize,
    pub bytes_written: usize,
    pub rotation_count: usize,
    pub query_count: usize,
    pub query_result_count: usize,
    pub avg_query_duration: Duration,
    pub buckets_read: usize,
    pub buckets_missing: usize,
    pub bucket_read_failures: usize,
    pub malformed_lines: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cache_hit_rate: f64,
    pub uptime: Duration,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            write_count: AtomicUsize::new(0),
            bytes_written: AtomicUsize::new(0),
            rotation_count: AtomicUsize::new(0),

            query_count: AtomicUsize::new(0),
            query_result_count: AtomicUsize::new(0),
            query_duration_ns: AtomicU64::new(0),
            buckets_read: AtomicUsize::new(0),
            buckets_missing: AtomicUsize::new(0),
            bucket_read_failures: AtomicUsize::new(0),
            malformed_lines: AtomicUsize::new(0),

            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),

            start_time: Instant::now(),
        }
    }

    // Write path

    /// Record one appended entry
    pub fn record_write(&self, bytes: usize) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Increment rotation count
    pub fn increment_rotations(&self) {
        self.rotation_count.fetch_add(1, Ordering::Relaxed);
    }

    // Query path

    /// Record a finished query
    pub fn record_query(&self, duration: Duration, results: usize) {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.query_result_count.fetch_add(results, Ordering::Relaxed);
        self.query_duration_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Increment successful bucket reads
    pub fn increment_buckets_read(&self) {
        self.buckets_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment missing bucket files
    pub fn increment_buckets_missing(&self) {
        self.buckets_missing.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failed bucket reads
    pub fn increment_bucket_read_failures(&self) {
        self.bucket_read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Add dropped malformed lines
    pub fn add_malformed_lines(&self, count: usize) {
        self.malformed_lines.fetch_add(count, Ordering::Relaxed);
    }

    // Cache metrics

    /// Increment cache hits
    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment cache misses
    pub fn increment_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    // Getters

    /// Get number of write operations
    pub fn get_write_count(&self) -> usize {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Get number of rotations
    pub fn get_rotation_count(&self) -> usize {
        self.rotation_count.load(Ordering::Relaxed)
    }

    /// Get number of query operations
    pub fn get_query_count(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    /// Get cache hit rate as a percentage
    pub fn get_cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    /// Get average query duration
    pub fn get_avg_query_duration(&self) -> Duration {
        let count = self.query_count.load(Ordering::Relaxed);
        if count == 0 {
            return Duration::from_secs(0);
        }

        let total_ns = self.query_duration_ns.load(Ordering::Relaxed);
        Duration::from_nanos(total_ns / count as u64)
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_count: self.get_write_count(),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            rotation_count: self.get_rotation_count(),
            query_count: self.get_query_count(),
            query_result_count: self.query_result_count.load(Ordering::Relaxed),
            avg_query_duration: self.get_avg_query_duration(),
            buckets_read: self.buckets_read.load(Ordering::Relaxed),
            buckets_missing: self.buckets_missing.load(Ordering::Relaxed),
            bucket_read_failures: self.bucket_read_failures.load(Ordering::Relaxed),
            malformed_lines: self.malformed_lines.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_hit_rate: self.get_cache_hit_rate(),
            uptime: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_basic() {
        let metrics = MetricsCollector::new();

        metrics.record_write(100);
        metrics.record_write(50);
        metrics.increment_rotations();
        metrics.record_query(Duration::from_millis(10), 3);
        metrics.record_query(Duration::from_millis(30), 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.write_count, 2);
        assert_eq!(snapshot.bytes_written, 150);
        assert_eq!(snapshot.rotation_count, 1);
        assert_eq!(snapshot.query_count, 2);
        assert_eq!(snapshot.query_result_count, 4);
        assert_eq!(snapshot.avg_query_duration, Duration::from_millis(20));
    }

    #[test]
    fn test_cache_hit_rate() {
        let metrics = MetricsCollector::new();
        assert_eq!(metrics.get_cache_hit_rate(), 0.0);

        for _ in 0..3 {
            metrics.increment_cache_hits();
        }
        metrics.increment_cache_misses();

        assert_eq!(metrics.get_cache_hit_rate(), 75.0);
    }

    #[test]
    fn test_bucket_read_counters() {
        let metrics = MetricsCollector::new();
        metrics.increment_buckets_read();
        metrics.increment_buckets_missing();
        metrics.increment_buckets_missing();
        metrics.increment_bucket_read_failures();
        metrics.add_malformed_lines(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.buckets_read, 1);
        assert_eq!(snapshot.buckets_missing, 2);
        assert_eq!(snapshot.bucket_read_failures, 1);
        assert_eq!(snapshot.malformed_lines, 4);
    }
}
