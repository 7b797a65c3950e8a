//! Convergence loop driver (lexv-lp) - Main entry point
//!
//! Usage: `lexv-lp [options] <input> -- <validator> [validator flags...]`

use anyhow::{Context, Result};
use clap::Parser;
use lexv_common::buckets::ensure_csv_input_path;
use lexv_common::config::load_config;
use lexv_common::logging::init_tracing;
use lexv_lp::{CommandPassRunner, ConvergenceLoop};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Command-line arguments for lexv-lp
#[derive(Parser, Debug)]
#[command(name = "lexv-lp")]
#[command(about = "Re-run the validator over its failures until the buckets converge")]
#[command(version)]
struct Args {
    /// Seconds to wait between passes
    #[arg(long, env = "LEXV_PAUSE_SECS")]
    pause_secs: Option<u64>,

    /// Stop after this many passes even if not converged
    #[arg(long, env = "LEXV_MAX_PASSES")]
    max_passes: Option<u32>,

    /// TOML configuration file
    #[arg(long, env = "LEXV_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    debug: bool,

    /// Initial input CSV
    input: PathBuf,

    /// Validator program and its flags, after `--`
    #[arg(last = true, required = true, num_args = 1..)]
    validator: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&toml.logging.level, args.debug);

    let input = ensure_csv_input_path(&args.input).context("Invalid input path")?;
    if !input.is_file() {
        anyhow::bail!("Input not found: {}", input.display());
    }

    let (program, flags) = args
        .validator
        .split_first()
        .context("Missing validator command after --")?;

    let pause = Duration::from_secs(args.pause_secs.unwrap_or(toml.convergence.pause_secs));
    let max_passes = args.max_passes.or(toml.convergence.max_passes);
    if max_passes == Some(0) {
        anyhow::bail!("--max-passes must be at least 1");
    }

    info!(
        input = %input.display(),
        validator = %program,
        pause_secs = pause.as_secs(),
        ?max_passes,
        "Starting convergence loop"
    );

    let runner = CommandPassRunner::new(program, flags.iter());
    let outcome = ConvergenceLoop::new(runner, pause, max_passes)
        .run(input)
        .await
        .context("Convergence loop failed")?;

    info!(
        passes = outcome.passes,
        reason = %outcome.reason,
        final_input = %outcome.final_input.display(),
        "Done"
    );
    Ok(())
}
