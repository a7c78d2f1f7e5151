//! Error handling for the log store
//!
//! This module provides error types and result aliases for store operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in log store operations
#[derive(Error, Debug)]
pub enum Error {
    /// Errors related to storage operations
    #[error("Storage error for {path:?}: {message}")]
    Storage {
        path: PathBuf,
        message: String,
    },

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A severity outside the supported set
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// A sort order other than `asc` or `desc`
    #[error("Invalid sort order: {0}")]
    InvalidOrder(String),

    /// A timestamp that could not be interpreted
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The caller lacks the credential required for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Errors related to backend binding
    #[error("Adapter error: {0}")]
    Adapter(String),
}

/// Result type for log store operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new storage error
    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new invalid level error
    pub fn invalid_level(level: impl Into<String>) -> Self {
        Self::InvalidLevel(level.into())
    }

    /// Create a new invalid order error
    pub fn invalid_order(order: impl Into<String>) -> Self {
        Self::InvalidOrder(order.into())
    }

    /// Create a new invalid timestamp error
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp(message.into())
    }

    /// Create a new forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a new adapter error
    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter(message.into())
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Check if this error was raised while validating caller input, before any I/O
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::InvalidLevel(_) | Self::InvalidOrder(_) | Self::InvalidTimestamp(_)
        )
    }

    /// Check if this is a forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Get a user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Storage { .. } => Some("Check if the log directory exists and is writable".to_string()),
            Self::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                Some("The specified file or directory does not exist".to_string())
            }
            Self::Io(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                Some("You don't have permission to access this file or directory".to_string())
            }
            Self::InvalidLevel(_) => Some("Use one of: info, error".to_string()),
            Self::InvalidOrder(_) => Some("Use one of: asc, desc".to_string()),
            Self::InvalidTimestamp(_) => {
                Some("Pass milliseconds since the epoch or an RFC 3339 timestamp".to_string())
            }
            Self::Forbidden(_) => Some("Retry the request with the master key".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::Error as _;

    #[test]
    fn test_error_creation() {
        let storage_err = Error::storage("/var/logs", "Failed to create directory");
        assert!(matches!(storage_err, Error::Storage { .. }));

        let level_err = Error::invalid_level("warn");
        assert!(matches!(level_err, Error::InvalidLevel(ref l) if l == "warn"));
        assert!(level_err.is_validation_error());

        let forbidden = Error::forbidden("no master key");
        assert!(forbidden.is_forbidden());
        assert!(!forbidden.is_validation_error());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err = Error::from(io_err);
        assert!(err.is_io_error());

        let json_err = serde_json::Error::custom("Invalid JSON");
        let err = Error::from(json_err);
        assert!(err.is_serialization_error());
    }

    #[test]
    fn test_error_suggestion() {
        let err = Error::invalid_order("sideways");
        assert!(err.to_string().contains("sideways"));
        assert!(err.suggestion().unwrap().contains("asc"));

        let err = Error::adapter("already bound");
        assert!(err.suggestion().is_none());
    }
}
