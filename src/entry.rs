//! Log entries and their line encoding
//!
//! Every entry is stored as a single JSON object terminated by a newline, e.g.
//! `{"level":"info","message":"user signed in","timestamp":"2016-02-04T05:59:27.412Z"}`.
//! A message containing a newline splits its record in two; such lines fail to
//! decode on read and are dropped.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Severity of a log entry; each severity is stored in its own bucket files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    /// Get the name used in bucket file names and serialized entries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "error" => Ok(Self::Error),
            _ => Err(Error::invalid_level(s)),
        }
    }
}

/// A single log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: Severity,
    pub message: String,
    #[serde(with = "millis_rfc3339")]
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(level: Severity, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp,
        }
    }

    /// Encode the entry as one line, without the terminator
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an entry from one stored line
    pub fn from_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

mod millis_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_severity_parsing() {
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert!(matches!("warn".parse::<Severity>(), Err(Error::InvalidLevel(_))));
        assert_eq!(Severity::default(), Severity::Info);
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn test_line_format() -> Result<()> {
        let ts = Utc.with_ymd_and_hms(2016, 2, 4, 5, 59, 27).unwrap()
            + chrono::Duration::milliseconds(412);
        let entry = LogEntry::new(Severity::Info, "user signed in", ts);

        let line = entry.to_line()?;
        assert_eq!(
            line,
            r#"{"level":"info","message":"user signed in","timestamp":"2016-02-04T05:59:27.412Z"}"#
        );
        assert_eq!(LogEntry::from_line(&line)?, entry);
        Ok(())
    }

    #[test]
    fn test_from_line_accepts_offsets() -> Result<()> {
        let entry = LogEntry::from_line(
            r#"{"level":"error","message":"x","timestamp":"2024-01-15T10:00:00+02:00"}"#,
        )?;
        assert_eq!(entry.level, Severity::Error);
        assert_eq!(entry.timestamp, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());
        Ok(())
    }

    #[test]
    fn test_from_line_rejects_garbage() {
        assert!(LogEntry::from_line("not json").is_err());
        assert!(LogEntry::from_line(r#"{"level":"info","message":"x"}"#).is_err());
        assert!(LogEntry::from_line(r#"{"level":"info","message":"x","timestamp":"yesterday"}"#).is_err());
    }
}
