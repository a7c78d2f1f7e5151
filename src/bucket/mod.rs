//! Day-bucketed file storage
//!
//! Logs are organized into one append-only file per calendar day and severity.
//! The day a write lands in is decided by the wall clock at write time, not by the
//! entry's own timestamp; queries filter on the entry timestamp.

mod id;
mod util;
mod writer;

pub use id::BucketId;
pub use util::{bucket_path, bucket_span, list_bucket_files, read_bucket, BucketFile, BucketRead};
pub use writer::BucketWriter;
