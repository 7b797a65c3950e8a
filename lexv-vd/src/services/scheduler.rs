//! Worker pool driving one validation pass
//!
//! Records flow Parser → Lookup → Classifier inside up to `workers`
//! concurrent futures (`buffer_unordered`); completed dispositions are
//! written by this loop alone, so the bucket writer needs no locking.
//! Completion order, not input order, decides output order.
//!
//! A size target is a soft stop: once reached no new record is pulled from
//! the parser, but lookups already dispatched finish and are written.

use crate::models::{Disposition, ParsedRecord, PassStats};
use crate::services::bucket_writer::BucketWriter;
use crate::services::classifier::Classifier;
use crate::services::lookup_client::LexicalLookup;
use futures::stream::{Stream, StreamExt};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Pass-level settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Locale key expected in dictionary responses
    pub locale: String,
    /// Also probe the capitalised variant of each word
    pub dual_probe: bool,
    /// Maximum lookups in flight
    pub workers: usize,
    /// Emit a progress snapshot every N completions (0 disables)
    pub progress_every: u64,
    /// Overwrite the progress line on standard error
    pub show_progress: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            dual_probe: false,
            workers: 8,
            progress_every: 100,
            show_progress: true,
        }
    }
}

pub struct Scheduler<L: LexicalLookup + 'static> {
    lookup: Arc<L>,
    classifier: Classifier,
    config: SchedulerConfig,
}

impl<L: LexicalLookup + 'static> Scheduler<L> {
    pub fn new(lookup: Arc<L>, classifier: Classifier, config: SchedulerConfig) -> Self {
        Self {
            lookup,
            classifier,
            config,
        }
    }

    /// Run one pass over `records`
    ///
    /// `stats` is the pass accumulator; it is returned with final counts.
    /// An input read error stops dispatch, in-flight work still drains and
    /// is flushed, then the error is returned.
    pub async fn run_pass<S>(
        &self,
        records: S,
        writer: &mut BucketWriter,
        mut stats: PassStats,
    ) -> std::io::Result<PassStats>
    where
        S: Stream<Item = std::io::Result<ParsedRecord>>,
    {
        let stop = CancellationToken::new();
        if stats.target_reached() {
            stop.cancel();
        }
        let gate = stop.clone();

        let completions = records
            .take_while(move |_| futures::future::ready(!gate.is_cancelled()))
            .map(|record| self.dispatch(record))
            .buffer_unordered(self.config.workers.max(1));
        futures::pin_mut!(completions);

        let mut input_error: Option<std::io::Error> = None;

        while let Some(completed) = completions.next().await {
            let disposition = match completed {
                Ok(d) => d,
                Err(e) => {
                    error!(error = %e, "Input read failed, draining in-flight lookups");
                    stop.cancel();
                    input_error.get_or_insert(e);
                    continue;
                }
            };

            writer.write(&disposition, &mut stats).await?;

            if stats.target_reached() && !stop.is_cancelled() {
                info!(
                    validated = stats.validated,
                    "Validated target reached, no new lookups will start"
                );
                stop.cancel();
            }

            if self.config.progress_every > 0 && stats.processed % self.config.progress_every == 0 {
                self.report_progress(&stats);
            }
        }

        writer.flush().await?;

        let printed_progress = self.config.progress_every > 0 && stats.processed >= self.config.progress_every;
        if self.config.show_progress && printed_progress {
            eprintln!();
        }

        match input_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }

    /// Future resolving to the disposition of one record
    async fn dispatch(&self, record: std::io::Result<ParsedRecord>) -> std::io::Result<Disposition> {
        let task = match record? {
            ParsedRecord::Task(task) => task,
            malformed => {
                return self
                    .classifier
                    .classify_record(&malformed)
                    .ok_or_else(|| std::io::Error::other("unclassifiable record"));
            }
        };

        let probes = self
            .lookup
            .probe_task(&task.word, &self.config.locale, self.config.dual_probe)
            .await;
        Ok(self.classifier.classify(&task, &probes))
    }

    fn report_progress(&self, stats: &PassStats) {
        let line = stats.display_string();
        tracing::debug!(progress = %line, "Pass progress");
        if self.config.show_progress {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "\r{}", line);
            let _ = err.flush();
        }
    }
}
