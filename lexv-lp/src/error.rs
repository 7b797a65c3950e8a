//! Error types for lexv-lp

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoopError {
    /// Validator could not be started
    #[error("Failed to launch validator '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Validator exited unsuccessfully
    #[error("Validator pass {pass} failed: {status}")]
    PassFailed { pass: u32, status: String },

    /// Bucket read or input naming failure
    #[error("Bucket error: {0}")]
    Bucket(#[from] lexv_common::Error),

    /// Writing the retry input failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LoopResult<T> = Result<T, LoopError>;
