//! Convergence loop
//!
//! A state machine over validator passes:
//!
//! ```text
//! RUN(input) ──pass──▶ R empty?                      ──yes──▶ STOP(no_hard_failures)
//!                      N set-equal to previous N?    ──yes──▶ STOP(stable_nonexistent)
//!                      pass limit reached?           ──yes──▶ STOP(pass_limit)
//!                      otherwise: R ∪ N → R, pause, RUN(R)
//! ```
//!
//! Buckets are re-read from disk after every pass and compared as sets of
//! normalised words, so line order never matters. Passes never overlap.

use crate::error::LoopResult;
use crate::pass_runner::PassRunner;
use crate::retry_input::build_retry_input;
use lexv_common::buckets::{read_bucket_words, BucketPaths};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last pass hard-rejected nothing
    NoHardFailures,
    /// The nonexistent set matched the previous pass
    StableNonexistent,
    /// Configured maximum number of passes reached
    PassLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHardFailures => write!(f, "no_hard_failures"),
            Self::StableNonexistent => write!(f, "stable_nonexistent"),
            Self::PassLimit => write!(f, "pass_limit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Passes executed
    pub passes: u32,
    pub reason: StopReason,
    /// Input of the last pass
    pub final_input: PathBuf,
}

/// State carried from one pass to the next
#[derive(Debug, Clone)]
struct LoopState {
    pass: u32,
    current_input: PathBuf,
    previous_nonexistent: Option<BTreeSet<String>>,
}

pub struct ConvergenceLoop<R: PassRunner> {
    runner: R,
    pause: Duration,
    max_passes: Option<u32>,
}

impl<R: PassRunner> ConvergenceLoop<R> {
    pub fn new(runner: R, pause: Duration, max_passes: Option<u32>) -> Self {
        Self {
            runner,
            pause,
            max_passes,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run passes from `input` until a stop condition holds
    pub async fn run(&self, input: PathBuf) -> LoopResult<LoopOutcome> {
        let mut state = LoopState {
            pass: 0,
            current_input: input,
            previous_nonexistent: None,
        };

        loop {
            state.pass += 1;
            self.runner.run_pass(state.pass, &state.current_input).await?;

            let buckets = BucketPaths::for_input(&state.current_input);
            let hard_rejected = read_bucket_words(&buckets.hard_rejected).await?;
            let nonexistent = read_bucket_words(&buckets.nonexistent).await?;

            info!(
                pass = state.pass,
                hard_rejected = hard_rejected.len(),
                nonexistent = nonexistent.len(),
                "Pass finished"
            );

            let stop = if hard_rejected.is_empty() {
                Some(StopReason::NoHardFailures)
            } else if state.previous_nonexistent.as_ref() == Some(&nonexistent) {
                Some(StopReason::StableNonexistent)
            } else if self.max_passes.is_some_and(|max| state.pass >= max) {
                Some(StopReason::PassLimit)
            } else {
                None
            };

            if let Some(reason) = stop {
                info!(passes = state.pass, reason = %reason, "Loop stopped");
                return Ok(LoopOutcome {
                    passes: state.pass,
                    reason,
                    final_input: state.current_input,
                });
            }

            let (next_input, words) = build_retry_input(&buckets).await?;
            info!(
                next_input = %next_input.display(),
                words,
                pause_secs = self.pause.as_secs(),
                "Not converged, retrying failures"
            );

            state.previous_nonexistent = Some(nonexistent);
            state.current_input = next_input;

            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }
    }
}
