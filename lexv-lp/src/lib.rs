//! lexv-lp library interface
//!
//! Re-runs the validator over its own failure buckets until the
//! hard-rejected bucket is empty or the nonexistent set stops changing.

pub mod convergence;
pub mod error;
pub mod pass_runner;
pub mod retry_input;

pub use crate::convergence::{ConvergenceLoop, LoopOutcome, StopReason};
pub use crate::error::{LoopError, LoopResult};
pub use crate::pass_runner::{CommandPassRunner, PassRunner};
