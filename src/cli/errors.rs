//! CLI-specific error types
//!
//! Every CLI error ends the run with a non-zero exit status.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::failover::FailoverError;
use crate::lock::LockError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Program lock could not be created
    LockError,
    /// I/O error (stdout)
    IoError,
    /// A failover operation failed; its message is already on stdout
    OperationFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "REPFAIL_CLI_CONFIG_ERROR",
            Self::LockError => "REPFAIL_CLI_LOCK_ERROR",
            Self::IoError => "REPFAIL_CLI_IO_ERROR",
            Self::OperationFailed => "REPFAIL_CLI_OPERATION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn lock_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::LockError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn operation_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::OperationFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The operator has already seen this error on stdout.
    pub fn is_reported(&self) -> bool {
        self.code == CliErrorCode::OperationFailed
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<LockError> for CliError {
    fn from(e: LockError) -> Self {
        Self::lock_error(e.to_string())
    }
}

impl From<FailoverError> for CliError {
    fn from(e: FailoverError) -> Self {
        Self::operation_failed(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
