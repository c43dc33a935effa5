//! # Config Errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Replica set configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    // ==================
    // File Errors
    // ==================

    /// File could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid replica set document
    #[error("Invalid config JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ==================
    // Validation Errors
    // ==================

    /// No replica entries
    #[error("Config lists no replicas")]
    NoReplicas,

    /// Two entries share a name
    #[error("Duplicate replica name: {0}")]
    DuplicateName(String),

    /// Required field is empty
    #[error("Replica entry {index}: {field} must not be empty")]
    EmptyField { index: usize, field: &'static str },

    /// Port 0
    #[error("Replica {name}: port must be > 0")]
    InvalidPort { name: String },

    /// Zero-second timeout
    #[error("{0} must be > 0")]
    InvalidTimeout(&'static str),
}
