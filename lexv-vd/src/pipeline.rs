//! One validation pass, end to end
//!
//! Opens the input and bucket outputs, then hands the record stream to the
//! scheduler. Anything that fails here fails before the first lookup.

use crate::config::{InputSource, ValidatorConfig};
use crate::error::ValidatorResult;
use crate::models::PassStats;
use crate::services::{BucketWriter, Classifier, DictionaryClient, LexicalLookup, RecordParser, Scheduler};
use lexv_common::buckets::remove_artifacts;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

/// Run a pass against the configured dictionary endpoint
pub async fn run(config: &ValidatorConfig) -> ValidatorResult<PassStats> {
    let client = DictionaryClient::new(config.lookup.clone())?;
    run_with_lookup(config, Arc::new(client)).await
}

/// Run a pass with a caller-supplied lookup
pub async fn run_with_lookup<L>(config: &ValidatorConfig, lookup: Arc<L>) -> ValidatorResult<PassStats>
where
    L: LexicalLookup + 'static,
{
    let (reader, mut writer): (Box<dyn AsyncBufRead + Send + Unpin>, BucketWriter) = match &config.input {
        InputSource::Stdin => {
            if config.reset {
                tracing::warn!("--reset has no effect when reading standard input");
            }
            info!(locale = %config.scheduler.locale, "Validating standard input");
            (
                Box::new(BufReader::new(tokio::io::stdin())),
                BucketWriter::streaming(config.flush_every),
            )
        }
        InputSource::File { path, buckets } => {
            if config.reset {
                remove_artifacts(path).await?;
                info!("Removed previous artifacts for {}", path.display());
            }
            let file = tokio::fs::File::open(path).await?;
            let writer = BucketWriter::open_files(buckets, config.flush_every).await?;
            info!(
                locale = %config.scheduler.locale,
                input = %path.display(),
                validated = %buckets.validated.display(),
                workers = config.scheduler.workers,
                dual_probe = config.scheduler.dual_probe,
                "Validating input file"
            );
            (Box::new(BufReader::new(file)), writer)
        }
    };

    let records = RecordParser::new(config.parser).records(reader);
    let scheduler = Scheduler::new(
        lookup,
        Classifier::new(config.wrong_locale),
        config.scheduler.clone(),
    );

    let result = scheduler
        .run_pass(records, &mut writer, PassStats::new(config.size))
        .await;
    writer.finish().await?;
    let stats = result?;

    info!(
        processed = stats.processed,
        validated = stats.validated,
        retry = stats.retry,
        nonexistent = stats.nonexistent,
        hard_rejected = stats.hard_rejected,
        elapsed_secs = stats.elapsed().as_secs_f64(),
        "Pass complete"
    );
    Ok(stats)
}
