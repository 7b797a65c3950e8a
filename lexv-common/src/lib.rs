//! # lexv Common Library
//!
//! Shared code for the lexv validation tools including:
//! - Error type shared by the validator and the convergence loop
//! - TOML configuration loading
//! - Bucket file naming and bucket file reading
//! - Term normalization (part-of-speech suffix stripping)
//! - Tracing initialisation

pub mod buckets;
pub mod config;
pub mod error;
pub mod logging;
pub mod terms;

pub use error::{Error, Result};
