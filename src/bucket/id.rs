//! Bucket identifiers
//!
//! A bucket is one calendar day in the process's local time zone, named by its
//! ISO-8601 date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

use crate::error::{Error, Result};

/// Identifier of a day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketId(NaiveDate);

impl BucketId {
    /// Get the bucket holding the given instant, floored to local midnight
    pub fn of(timestamp: &DateTime<Utc>) -> Self {
        let utc = timestamp.naive_utc();
        let offset = Local.offset_from_utc_datetime(&utc).local_minus_utc();
        // Instants at the edge of the representable range keep their UTC date.
        let local = utc
            .checked_add_signed(Duration::seconds(i64::from(offset)))
            .unwrap_or(utc);
        Self(local.date())
    }

    /// Create a bucket from a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the bucket one day earlier
    pub fn previous(&self) -> Self {
        // NaiveDate::MIN has no predecessor; stay put rather than fail.
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// Get the first instant of this bucket
    pub fn start(&self) -> DateTime<Utc> {
        let midnight = self.0.and_hms_opt(0, 0, 0).unwrap_or_default();
        // A zone may skip local midnight for DST; fall back to reading the wall time as UTC.
        Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    /// List every bucket from `until` down to `from`, both inclusive
    ///
    /// Returns an empty list when `from` is later than `until`.
    pub fn descending(from: BucketId, until: BucketId) -> Vec<BucketId> {
        let mut buckets = Vec::new();
        let mut current = until;
        while current >= from {
            buckets.push(current);
            let prev = current.previous();
            if prev == current {
                break;
            }
            current = prev;
        }
        buckets
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for BucketId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|e| Error::invalid_timestamp(format!("Invalid bucket id {}: {}", s, e)))
    }
}
