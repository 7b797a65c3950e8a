//! Record parser
//!
//! Turns input lines (`term,term_frequency[,...]`) into tasks. Input is
//! assumed to be sorted by descending frequency: once a frequency drops
//! below the configured floor the parser stops reading altogether.

use crate::models::{ParsedRecord, Task};
use async_stream::try_stream;
use futures::Stream;
use lexv_common::terms::{is_header, leading_fields, normalize_term};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

/// Pre-filters applied before a task is dispatched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Minimum word length in characters (inclusive)
    pub min_len: Option<usize>,
    /// Maximum word length in characters (inclusive)
    pub max_len: Option<usize>,
    /// Stop reading once frequency falls below this value
    pub min_frequency: Option<u64>,
}

/// What to do with one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank, header, or outside the length bounds; not counted anywhere
    Skip,
    /// Frequency floor crossed; no further input is read
    Stop,
    Record(ParsedRecord),
}

#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    config: ParserConfig,
}

impl RecordParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn parse_line(&self, raw: &str) -> LineOutcome {
        let line = raw.trim();
        if line.is_empty() || is_header(line) {
            return LineOutcome::Skip;
        }

        let Some((term, freq_field)) = leading_fields(line) else {
            return LineOutcome::Record(ParsedRecord::Malformed {
                word: line.to_string(),
                source_line: line.to_string(),
                detail: "missing frequency field".to_string(),
            });
        };

        let word = normalize_term(term);

        let frequency = match freq_field.parse::<u64>() {
            Ok(f) => f,
            Err(e) => {
                return LineOutcome::Record(ParsedRecord::Malformed {
                    word: word.to_string(),
                    source_line: line.to_string(),
                    detail: format!("frequency '{}': {}", freq_field, e),
                });
            }
        };

        if self.config.min_frequency.is_some_and(|floor| frequency < floor) {
            return LineOutcome::Stop;
        }

        if word.is_empty() {
            return LineOutcome::Record(ParsedRecord::Malformed {
                word: String::new(),
                source_line: line.to_string(),
                detail: "empty term".to_string(),
            });
        }

        let len = word.chars().count();
        let too_short = self.config.min_len.is_some_and(|min| len < min);
        let too_long = self.config.max_len.is_some_and(|max| len > max);
        if too_short || too_long {
            return LineOutcome::Skip;
        }

        LineOutcome::Record(ParsedRecord::Task(Task::new(word, frequency, line)))
    }

    /// Classify raw line bytes; text that is not UTF-8 is malformed
    pub fn parse_bytes(&self, raw: &[u8]) -> LineOutcome {
        match std::str::from_utf8(raw) {
            Ok(line) => self.parse_line(line),
            Err(e) => {
                let lossy = String::from_utf8_lossy(raw);
                let line = lossy.trim();
                let word = leading_fields(line).map_or(line, |(term, _)| normalize_term(term));
                LineOutcome::Record(ParsedRecord::Malformed {
                    word: word.to_string(),
                    source_line: line.to_string(),
                    detail: format!("invalid UTF-8: {}", e),
                })
            }
        }
    }

    /// Lazily parse `reader` line by line
    ///
    /// Nothing past the frequency floor is read. Undecodable lines become
    /// malformed records; only I/O errors end the stream.
    pub fn records<R>(self, mut reader: R) -> impl Stream<Item = std::io::Result<ParsedRecord>>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        try_stream! {
            let mut buf = Vec::new();
            let mut skipped: u64 = 0;
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf).await? == 0 {
                    break;
                }
                match self.parse_bytes(&buf) {
                    LineOutcome::Skip => skipped += 1,
                    LineOutcome::Stop => {
                        info!(
                            min_frequency = ?self.config.min_frequency,
                            "Frequency floor reached, stopping input"
                        );
                        break;
                    }
                    LineOutcome::Record(record) => yield record,
                }
            }
            debug!(skipped, "Input exhausted");
        }
    }
}
