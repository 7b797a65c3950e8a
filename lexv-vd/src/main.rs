//! Word list validator (lexv-vd) - Main entry point
//!
//! Exit status is 0 whenever the pass ran, including an early stop on the
//! size target; setup failures exit non-zero before any lookup.

use anyhow::{Context, Result};
use clap::Parser;
use lexv_common::config::load_config;
use lexv_common::logging::init_tracing;
use lexv_vd::{pipeline, ValidatorArgs, ValidatorConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ValidatorArgs::parse();

    let toml = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&toml.logging.level, args.debug);

    let config = ValidatorConfig::resolve(&args, &toml).context("Invalid validator setup")?;

    let stats = pipeline::run(&config).await.context("Validation pass failed")?;

    info!("{}", stats.display_string());
    Ok(())
}
