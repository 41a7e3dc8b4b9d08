//! Error types for the logging core

use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Subsystem id not present in the registry
    #[error("Invalid subsystem id: {id}")]
    InvalidSubsystem { id: u8 },

    /// Level id above DEBUG
    #[error("Invalid log level: {level}")]
    InvalidLevel { level: u8 },

    /// Configuration lock could not be obtained in time
    #[error("Unable to get {mode} lock within {timeout:?}")]
    LockAcquire { mode: &'static str, timeout: Duration },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Bytes read from a channel do not form a valid record
    #[error("Malformed log record: {0}")]
    MalformedRecord(String),

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    pub fn invalid_subsystem(id: u8) -> Self {
        LoggerError::InvalidSubsystem { id }
    }

    pub fn invalid_level(level: u8) -> Self {
        LoggerError::InvalidLevel { level }
    }

    /// Create a lock acquisition error for the given lock mode ("read" or "write")
    pub fn lock_acquire(mode: &'static str, timeout: Duration) -> Self {
        LoggerError::LockAcquire { mode, timeout }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        LoggerError::MalformedRecord(msg.into())
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error reports a rejected argument rather than a runtime failure
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidSubsystem { .. } | LoggerError::InvalidLevel { .. }
        )
    }
}
