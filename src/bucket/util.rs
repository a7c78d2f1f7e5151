//! Utility functions for bucket files
//!
//! Provides helpers for naming, listing and reading the files of the bucket directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::bucket::BucketId;
use crate::entry::Severity;
use crate::error::Result;

/// A bucket file found in the log directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketFile {
    pub bucket: BucketId,
    pub level: Severity,
    pub path: PathBuf,
}

/// Outcome of reading one bucket file
#[derive(Debug)]
pub enum BucketRead {
    /// Non-blank lines in file order
    Lines(Vec<String>),
    /// No file exists for the bucket
    Missing,
    /// The file exists but could not be read
    Failed(io::Error),
}

impl BucketRead {
    /// Get the lines read, treating any failure as an empty bucket
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::Lines(lines) => lines,
            Self::Missing | Self::Failed(_) => Vec::new(),
        }
    }
}

/// Get the path for a bucket file
pub fn bucket_path(base_dir: &Path, bucket: BucketId, level: Severity) -> PathBuf {
    base_dir.join(format!("{}.{}", bucket, level))
}

/// Read every non-blank line of a bucket file
pub fn read_bucket(path: &Path) -> BucketRead {
    match fs::read_to_string(path) {
        Ok(content) => BucketRead::Lines(
            content
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Err(e) if e.kind() == io::ErrorKind::NotFound => BucketRead::Missing,
        Err(e) => BucketRead::Failed(e),
    }
}

/// Get the earliest and latest days named on disk for `level`
///
/// Every directory entry named like a bucket counts, whether or not it can be read.
/// Returns `None` when no such entry exists.
pub fn bucket_span(base_dir: &Path, level: Severity) -> Result<Option<(BucketId, BucketId)>> {
    if !base_dir.exists() {
        return Ok(None);
    }

    let mut span: Option<(BucketId, BucketId)> = None;

    for entry in fs::read_dir(base_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some(level.as_str()) {
            continue;
        }

        let Some(bucket) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|stem| stem.parse::<BucketId>().ok())
        else {
            continue;
        };

        span = Some(match span {
            Some((earliest, latest)) => (earliest.min(bucket), latest.max(bucket)),
            None => (bucket, bucket),
        });
    }

    Ok(span)
}

/// List all bucket files in a directory, oldest day first
pub fn list_bucket_files(base_dir: &Path) -> Result<Vec<BucketFile>> {
    if !base_dir.exists() {
        return Ok(Vec::new());
    }

    let mut result = Vec::new();

    for entry in fs::read_dir(base_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|s| s.to_str()),
        ) else {
            continue;
        };

        if let (Ok(bucket), Ok(level)) = (stem.parse::<BucketId>(), ext.parse::<Severity>()) {
            // Only exact lowercase names are written by the store.
            if ext == level.as_str() {
                result.push(BucketFile { bucket, level, path });
            }
        }
    }

    result.sort_by(|a, b| a.bucket.cmp(&b.bucket).then(a.level.as_str().cmp(b.level.as_str())));

    Ok(result)
}
