//! Error types for the aguita_core library.

use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for aguita_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The shared container could not be created or written.
    ///
    /// This is the only fatal error: nothing can run without it.
    #[error("shared container unavailable at {path}: {reason}")]
    ContainerUnavailable { path: PathBuf, reason: String },

    /// A second record was inserted for a day that already has one
    #[error("a record for {0} already exists")]
    DuplicateDay(NaiveDate),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
