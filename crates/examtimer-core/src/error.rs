//! Core error types for examtimer-core.
//!
//! Every failure in the core is local and recoverable: callers fix the input
//! and invoke the operation again. Nothing here is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for examtimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed user input for a schedule entry
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Manual timer misuse
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Key-value persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors for exam windows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Start or end time left empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Not a 24-hour `HH:MM` time of day
    #[error("Invalid time of day for '{field}': {value:?}")]
    InvalidTime { field: &'static str, value: String },

    /// End does not come after start
    #[error("Invalid time range: end ({end}) must be after start ({start})")]
    InvalidRange { start: String, end: String },
}

/// Manual countdown errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Zero or negative duration
    #[error("Invalid duration: {0} ms (must be positive)")]
    InvalidDuration(i64),

    /// `start` called before `configure`
    #[error("No countdown configured")]
    NotConfigured,
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Persisted blob could not be encoded or decoded
    #[error("Encoding failed for key '{key}': {source}")]
    Encoding {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Alarm playback failure. Logged and swallowed by the dispatcher.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Output device refused the write
    #[error("Alarm output failed: {0}")]
    Io(#[from] std::io::Error),

    /// Sound command exited unsuccessfully
    #[error("Alarm command '{command}' failed: {message}")]
    Command { command: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
