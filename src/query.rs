use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bucket::{bucket_path, bucket_span, read_bucket, BucketId, BucketRead};
use crate::cache::{CacheKey, CachedLine};
use crate::config::StoreConfig;
use crate::entry::{LogEntry, Severity};
use crate::error::{Error, Result};
use crate::metrics::MetricsCollector;

/// Sort order for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Oldest day first
    Ascending,
    /// Most recent day first
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Descending
    }
}

impl SortOrder {
    /// Get the name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _ => Err(Error::invalid_order(s)),
        }
    }
}

/// Time range for querying logs, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Check whether a timestamp falls inside the range
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }

    /// Get the day buckets of both bounds
    pub fn rounded(&self) -> (BucketId, BucketId) {
        (BucketId::of(&self.start), BucketId::of(&self.end))
    }
}

/// Caller-facing query options; unset fields fall back to the store defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub size: Option<usize>,
    pub order: Option<SortOrder>,
    pub level: Option<Severity>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn in_range(self, range: TimeRange) -> Self {
        self.from(range.start).until(range.end)
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn order_ascending(self) -> Self {
        self.order(SortOrder::Ascending)
    }

    pub fn order_descending(self) -> Self {
        self.order(SortOrder::Descending)
    }

    pub fn level(mut self, level: Severity) -> Self {
        self.level = Some(level);
        self
    }

    /// Fill unset fields from the configuration, relative to `now`
    ///
    /// Both time defaults are measured from `now`, so an `until` older than the
    /// default lookback with no `from` resolves to an empty window.
    pub fn resolve(&self, now: DateTime<Utc>, config: &StoreConfig) -> ResolvedQuery {
        let until = self.until.unwrap_or(now);
        let from = self.from.unwrap_or_else(|| {
            now.checked_sub_signed(config.default_lookback())
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        });

        ResolvedQuery {
            range: TimeRange::new(from, until),
            size: self.size.unwrap_or(config.default_query_size),
            order: self.order.unwrap_or_default(),
            level: self.level.unwrap_or_default(),
        }
    }
}

/// A query with every option decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub range: TimeRange,
    pub size: usize,
    pub order: SortOrder,
    pub level: Severity,
}

impl ResolvedQuery {
    /// Get the cache key of this query
    pub fn cache_key(&self) -> CacheKey {
        let (from_bucket, until_bucket) = self.range.rounded();
        CacheKey {
            from_bucket,
            until_bucket,
            level: self.level,
        }
    }

    /// Check whether the rounded window is empty
    pub fn is_empty_window(&self) -> bool {
        let (from_bucket, until_bucket) = self.range.rounded();
        from_bucket > until_bucket
    }
}

/// Reads, filters and assembles the buckets overlapping a time range
pub struct RangeQuery<'a> {
    base_dir: &'a Path,
    parallel: bool,
    metrics: &'a MetricsCollector,
}

impl<'a> RangeQuery<'a> {
    /// Create a query engine over a bucket directory
    pub fn new(base_dir: &'a Path, parallel: bool, metrics: &'a MetricsCollector) -> Self {
        Self {
            base_dir,
            parallel,
            metrics,
        }
    }

    /// Read every bucket of the range and assemble the matching lines
    ///
    /// Buckets are visited from the latest day back to the earliest. Lines are appended
    /// for descending order and prepended for ascending order, so buckets always follow
    /// the requested direction while the lines of one day keep append order (descending)
    /// or reversed append order (ascending). Lines are never sorted by timestamp.
    pub fn assemble(&self, range: &TimeRange, level: Severity, order: SortOrder) -> Vec<CachedLine> {
        let buckets = self.buckets_in(range, level);

        // All reads finish before assembly starts; collect keeps bucket order.
        let per_bucket: Vec<Vec<CachedLine>> = if self.parallel && buckets.len() > 1 {
            buckets
                .par_iter()
                .map(|bucket| self.read_filtered(*bucket, level, range))
                .collect()
        } else {
            buckets
                .iter()
                .map(|bucket| self.read_filtered(*bucket, level, range))
                .collect()
        };

        let mut assembled = VecDeque::with_capacity(per_bucket.iter().map(Vec::len).sum());
        for lines in per_bucket {
            for line in lines {
                match order {
                    SortOrder::Descending => assembled.push_back(line),
                    SortOrder::Ascending => assembled.push_front(line),
                }
            }
        }

        debug!(
            buckets = buckets.len(),
            results = assembled.len(),
            %level,
            %order,
            "assembled range query"
        );

        assembled.into()
    }

    /// List the buckets of the range from latest to earliest
    ///
    /// Days outside the span of bucket names on disk hold nothing and are not visited.
    fn buckets_in(&self, range: &TimeRange, level: Severity) -> Vec<BucketId> {
        let (from_bucket, until_bucket) = range.rounded();

        match bucket_span(self.base_dir, level) {
            Ok(Some((earliest, latest))) => {
                BucketId::descending(from_bucket.max(earliest), until_bucket.min(latest))
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(dir = %self.base_dir.display(), error = %e, "cannot list bucket directory");
                BucketId::descending(from_bucket, until_bucket)
            }
        }
    }

    /// Read one bucket and keep the lines whose timestamp lies in the range
    fn read_filtered(&self, bucket: BucketId, level: Severity, range: &TimeRange) -> Vec<CachedLine> {
        let path = bucket_path(self.base_dir, bucket, level);

        let lines = match read_bucket(&path) {
            BucketRead::Lines(lines) => {
                self.metrics.increment_buckets_read();
                lines
            }
            BucketRead::Missing => {
                self.metrics.increment_buckets_missing();
                return Vec::new();
            }
            BucketRead::Failed(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable bucket file");
                self.metrics.increment_bucket_read_failures();
                return Vec::new();
            }
        };

        let mut malformed = 0;
        let kept = lines
            .into_iter()
            .filter_map(|raw| match LogEntry::from_line(&raw) {
                Ok(entry) if range.contains(&entry.timestamp) => Some(CachedLine {
                    timestamp: entry.timestamp,
                    raw,
                }),
                Ok(_) => None,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "dropping malformed log line");
                    malformed += 1;
                    None
                }
            })
            .collect();

        if malformed > 0 {
            self.metrics.add_malformed_lines(malformed);
        }

        kept
    }
}
