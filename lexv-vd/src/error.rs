//! Error types for lexv-vd
//!
//! Only process-level failures surface here (bad arguments, unreadable
//! input, unwritable buckets). Per-task failures are dispositions.

use crate::services::lookup_client::LookupError;
use thiserror::Error;

/// Validator setup and I/O errors
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Invalid command-line or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Input file does not exist
    #[error("Input not found: {0}")]
    InputNotFound(String),

    /// IO error reading input or writing buckets
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed
    #[error("Lookup client error: {0}")]
    Lookup(#[from] LookupError),

    /// lexv-common error
    #[error("Common error: {0}")]
    Common(#[from] lexv_common::Error),
}

/// Result type for validator operations
pub type ValidatorResult<T> = Result<T, ValidatorError>;
