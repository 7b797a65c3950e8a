//! Data model for the validator
//!
//! Task → ProbeResult(s) → Disposition, counted in PassStats.

pub mod disposition;
pub mod pass_stats;
pub mod probe;
pub mod task;

pub use disposition::{Bucket, Disposition, RejectReason, RetryReason};
pub use pass_stats::PassStats;
pub use probe::{ProbeResult, ProbeStatus};
pub use task::{ParsedRecord, Task};
