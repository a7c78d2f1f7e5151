//! Embedded log store with day-bucketed files
//!
//! Entries are appended to one file per calendar day and severity
//! (`{YYYY-MM-DD}.{info|error}`), one JSON object per line. Queries read the
//! buckets overlapping a time window in parallel, keep the entries whose
//! timestamp lies in the window and reuse the previous result for up to a minute.
//!
//! ```no_run
//! use bucketlog::{FileLogStore, QueryOptions, Severity};
//!
//! # fn main() -> bucketlog::Result<()> {
//! let store = FileLogStore::new("./logs")?;
//! store.info("server started")?;
//! store.error("upstream timed out")?;
//!
//! let recent = store.query(&QueryOptions::new().level(Severity::Error).size(20));
//! # let _ = recent;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod bucket;
pub mod cache;
pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod metrics;
#[cfg(feature = "async")]
pub mod nonblocking;
pub mod query;
pub mod route;
pub mod store;

pub use adapter::{AdapterRegistry, LoggerAdapter};
pub use bucket::BucketId;
pub use clock::{Clock, MockClock, SystemClock};
pub use config::StoreConfig;
pub use entry::{LogEntry, Severity};
pub use error::{Error, Result};
pub use metrics::MetricsSnapshot;
#[cfg(feature = "async")]
pub use nonblocking::{AsyncLoggerAdapter, Nonblocking};
pub use query::{QueryOptions, SortOrder, TimeRange};
pub use route::{handle_get, Auth, LogsParams};
pub use store::FileLogStore;
