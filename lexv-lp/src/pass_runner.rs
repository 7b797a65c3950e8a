//! Running one validator pass
//!
//! The loop only needs "validate this input file and leave the buckets next
//! to it". [`CommandPassRunner`] does that by launching the validator binary;
//! tests substitute a runner that writes bucket fixtures.

use crate::error::{LoopError, LoopResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

const RESET_FLAG: &str = "--reset";

#[async_trait]
pub trait PassRunner: Send + Sync {
    /// Validate `input`, producing its bucket files
    async fn run_pass(&self, pass: u32, input: &Path) -> LoopResult<()>;
}

/// Launches `<program> [args...] --reset <input>` and waits for it
#[derive(Debug, Clone)]
pub struct CommandPassRunner {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandPassRunner {
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments passed to the validator for `input`
    ///
    /// `--reset` is appended unless already present, so each pass starts
    /// from empty buckets.
    pub fn command_args(&self, input: &Path) -> Vec<OsString> {
        let mut args = self.args.clone();
        if !args.iter().any(|a| a == RESET_FLAG) {
            args.push(RESET_FLAG.into());
        }
        args.push(input.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl PassRunner for CommandPassRunner {
    async fn run_pass(&self, pass: u32, input: &Path) -> LoopResult<()> {
        let args = self.command_args(input);
        let program = self.program.to_string_lossy().into_owned();
        info!(pass, input = %input.display(), "Starting validator pass");
        debug!(program = %program, ?args, "Validator command line");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .map_err(|source| LoopError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(LoopError::PassFailed {
                pass,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
