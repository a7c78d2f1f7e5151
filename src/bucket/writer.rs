//! Append path with day rotation
//!
//! The writer tracks the current day and the open file of each severity. Every
//! append first compares the tracked day with the clock; on a new day both
//! severities are re-pointed together so their files always rotate in lock-step.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::bucket::{bucket_path, BucketId};
use crate::clock::Clock;
use crate::entry::Severity;
use crate::error::{Error, Result};
use crate::metrics::MetricsCollector;

/// Target file of one severity, opened on first append
#[derive(Debug)]
struct BucketTarget {
    path: PathBuf,
    file: Option<File>,
    /// A failed append may have left a partial record at the end of the file
    torn: bool,
}

impl BucketTarget {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: None,
            torn: false,
        }
    }

    fn append(&mut self, record: &[u8], sync: bool) -> Result<()> {
        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| {
                    Error::storage(&self.path, format!("Failed to open bucket file: {}", e))
                })?;
            self.file = Some(file);
        }

        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let written = write_record(file, record, self.torn).and_then(|()| {
            if sync {
                file.sync_data()
            } else {
                Ok(())
            }
        });

        match written {
            Ok(()) => {
                self.torn = false;
                Ok(())
            }
            Err(e) => {
                self.file = None;
                self.torn = true;
                Err(Error::storage(&self.path, format!("Failed to append to bucket file: {}", e)))
            }
        }
    }
}

/// Write one record, first terminating any fragment left by a failed append
///
/// Readers skip blank lines, so the extra terminator is harmless when the failed
/// append wrote nothing.
fn write_record<W: Write>(out: &mut W, record: &[u8], after_failure: bool) -> io::Result<()> {
    if after_failure {
        out.write_all(b"\n")?;
    }
    out.write_all(record)
}

/// Tracked day and the targets it maps to
#[derive(Debug)]
struct RotationState {
    tracked_day: BucketId,
    info: BucketTarget,
    error: BucketTarget,
}

impl RotationState {
    fn new(base_dir: &Path, day: BucketId) -> Self {
        Self {
            tracked_day: day,
            info: BucketTarget::new(bucket_path(base_dir, day, Severity::Info)),
            error: BucketTarget::new(bucket_path(base_dir, day, Severity::Error)),
        }
    }

    fn target(&mut self, level: Severity) -> &mut BucketTarget {
        match level {
            Severity::Info => &mut self.info,
            Severity::Error => &mut self.error,
        }
    }
}

/// Appends encoded entries to the bucket of the current day
pub struct BucketWriter {
    base_dir: PathBuf,
    sync_writes: bool,
    clock: Arc<dyn Clock>,
    state: Mutex<RotationState>,
    metrics: Arc<MetricsCollector>,
}

impl BucketWriter {
    /// Create a writer tracking the clock's current day
    pub fn new(
        base_dir: impl Into<PathBuf>,
        sync_writes: bool,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let base_dir = base_dir.into();
        let today = BucketId::of(&clock.now());
        let state = Mutex::new(RotationState::new(&base_dir, today));

        Self {
            base_dir,
            sync_writes,
            clock,
            state,
            metrics,
        }
    }

    /// Append one encoded entry plus a line terminator to today's bucket of `level`
    pub fn append(&self, level: Severity, line: &str) -> Result<()> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');

        let today = BucketId::of(&self.clock.now());

        // Rotation check and append happen under one lock so no writer can use a
        // stale target after another has rotated.
        let mut state = self.state.lock();
        if state.tracked_day != today {
            info!(from = %state.tracked_day, to = %today, "rotating log buckets");
            *state = RotationState::new(&self.base_dir, today);
            self.metrics.increment_rotations();
        }

        state.target(level).append(&record, self.sync_writes)?;
        drop(state);

        self.metrics.record_write(record.len());
        Ok(())
    }

    /// Get the day currently targeted by appends
    pub fn tracked_day(&self) -> BucketId {
        self.state.lock().tracked_day
    }

    /// Get the file the next append of `level` goes to, assuming no rotation
    pub fn current_path(&self, level: Severity) -> PathBuf {
        self.state.lock().target(level).path.clone()
    }
}
