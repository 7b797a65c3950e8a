//! lexv-vd library interface
//!
//! Validates a frequency-sorted word list against a remote dictionary and
//! splits it into validated, nonexistent, hard-rejected and retry buckets.
//! The binary is a thin wrapper over [`pipeline::run`].

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;

pub use crate::config::{InputSource, ValidatorArgs, ValidatorConfig};
pub use crate::error::{ValidatorError, ValidatorResult};
