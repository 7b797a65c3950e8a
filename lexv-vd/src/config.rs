//! Validator configuration
//!
//! Command-line flags (with environment fallbacks) are layered over the
//! `[validator]` table of the TOML file, which is layered over built-in
//! defaults. [`ValidatorConfig::resolve`] also performs every setup check
//! that must fail before the first lookup.

use crate::error::{ValidatorError, ValidatorResult};
use crate::services::{LookupSettings, ParserConfig, SchedulerConfig};
use clap::Parser;
use lexv_common::buckets::{ensure_csv_input_path, BucketPaths, STDIN_MARKER};
use lexv_common::config::{TomlConfig, WrongLocalePolicy};
use std::path::PathBuf;

/// Command-line arguments for lexv-vd
#[derive(Parser, Debug, Clone)]
#[command(name = "lexv-vd")]
#[command(about = "Validate a frequency-sorted word list against an online dictionary")]
#[command(version)]
pub struct ValidatorArgs {
    /// Locale section expected in dictionary entries (e.g. en, fr)
    pub locale: String,

    /// Input CSV (`term,term_frequency`), or `-` for standard input
    pub input: String,

    /// Validated output file (bare names land next to the input)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Delete existing output artifacts before the run
    #[arg(long)]
    pub reset: bool,

    /// Minimum word length
    #[arg(short = 'm', long)]
    pub min: Option<usize>,

    /// Maximum word length
    #[arg(short = 'M', long)]
    pub max: Option<usize>,

    /// Stop reading once frequency falls below this (input sorted descending)
    #[arg(short = 'f', long)]
    pub min_frequency: Option<u64>,

    /// Stop after this many validated words
    #[arg(short, long)]
    pub size: Option<u64>,

    /// Concurrent lookups
    #[arg(short, long, env = "LEXV_WORKERS")]
    pub workers: Option<usize>,

    /// Also probe the capitalised form of each word
    #[arg(long)]
    pub cap: bool,

    /// Debug logging
    #[arg(long)]
    pub debug: bool,

    /// Bucket for pages lacking the locale section: retry or reject
    #[arg(long, env = "LEXV_WRONG_LOCALE")]
    pub wrong_locale: Option<WrongLocalePolicy>,

    /// Flush bucket files every N records
    #[arg(long)]
    pub flush_every: Option<usize>,

    /// Global request rate cap, 0 for none
    #[arg(long)]
    pub rps: Option<u32>,

    /// Dictionary endpoint prefix
    #[arg(long, env = "LEXV_BASE_URL")]
    pub base_url: Option<String>,

    /// TOML configuration file
    #[arg(long, env = "LEXV_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Where records are read from and dispositions written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input, validated lines to stdout, the rest tagged to stderr
    Stdin,
    /// Input file with its four bucket files
    File { path: PathBuf, buckets: BucketPaths },
}

/// Fully resolved settings for one pass
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub input: InputSource,
    pub reset: bool,
    pub parser: ParserConfig,
    pub size: Option<u64>,
    pub scheduler: SchedulerConfig,
    pub lookup: LookupSettings,
    pub wrong_locale: WrongLocalePolicy,
    pub flush_every: usize,
}

impl ValidatorConfig {
    /// Merge `args` over `toml` and validate the result
    pub fn resolve(args: &ValidatorArgs, toml: &TomlConfig) -> ValidatorResult<Self> {
        let section = &toml.validator;

        let workers = args.workers.unwrap_or(section.workers);
        if workers < 1 {
            return Err(ValidatorError::InvalidArgument(
                "workers must be at least 1".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (args.min, args.max) {
            if min > max {
                return Err(ValidatorError::InvalidArgument(format!(
                    "min length {} exceeds max length {}",
                    min, max
                )));
            }
        }
        if args.size == Some(0) {
            return Err(ValidatorError::InvalidArgument(
                "size must be greater than 0".to_string(),
            ));
        }
        let locale = args.locale.trim();
        if locale.is_empty() {
            return Err(ValidatorError::InvalidArgument("locale is empty".to_string()));
        }

        let input = if args.input == STDIN_MARKER {
            if args.out.is_some() {
                tracing::warn!("--out ignored when reading standard input");
            }
            InputSource::Stdin
        } else {
            let path = ensure_csv_input_path(&PathBuf::from(&args.input))?;
            if !path.is_file() {
                return Err(ValidatorError::InputNotFound(path.display().to_string()));
            }
            let buckets = BucketPaths::with_validated_override(&path, args.out.as_deref());
            InputSource::File { path, buckets }
        };

        let mut lookup = LookupSettings::from(section);
        if let Some(rps) = args.rps {
            lookup.requests_per_second = rps;
        }
        if let Some(base_url) = &args.base_url {
            lookup.base_url = base_url.clone();
        }

        // Standard error carries the tagged diagnostics when streaming
        let show_progress = args.debug || !matches!(input, InputSource::Stdin);

        Ok(Self {
            input,
            reset: args.reset,
            parser: ParserConfig {
                min_len: args.min,
                max_len: args.max,
                min_frequency: args.min_frequency,
            },
            size: args.size,
            scheduler: SchedulerConfig {
                locale: locale.to_string(),
                dual_probe: args.cap,
                workers,
                progress_every: section.progress_every,
                show_progress,
            },
            lookup,
            wrong_locale: args.wrong_locale.unwrap_or(section.wrong_locale),
            flush_every: args.flush_every.unwrap_or(section.flush_every).max(1),
        })
    }
}
