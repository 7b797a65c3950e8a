//! Per-pass accounting
//!
//! Created by the caller, threaded through the scheduler and bucket writer,
//! and handed back when the pass ends. There is no process-wide counter
//! state.

use super::disposition::Bucket;
use std::time::{Duration, Instant};

/// Running counters for one validation pass
#[derive(Debug, Clone)]
pub struct PassStats {
    /// Dispositions written, all buckets
    pub processed: u64,
    pub validated: u64,
    pub retry: u64,
    pub nonexistent: u64,
    pub hard_rejected: u64,
    /// Word of the most recent disposition
    pub last_word: Option<String>,
    /// Validated target (`--size`), if any
    pub target: Option<u64>,
    started: Instant,
}

impl PassStats {
    pub fn new(target: Option<u64>) -> Self {
        Self {
            processed: 0,
            validated: 0,
            retry: 0,
            nonexistent: 0,
            hard_rejected: 0,
            last_word: None,
            target,
            started: Instant::now(),
        }
    }

    /// Count one disposition
    pub fn record(&mut self, bucket: Bucket, word: &str) {
        match bucket {
            Bucket::Validated => self.validated += 1,
            Bucket::Retry => self.retry += 1,
            Bucket::Nonexistent => self.nonexistent += 1,
            Bucket::HardRejected => self.hard_rejected += 1,
        }
        self.processed += 1;
        self.last_word = Some(word.to_string());
    }

    pub fn count(&self, bucket: Bucket) -> u64 {
        match bucket {
            Bucket::Validated => self.validated,
            Bucket::Retry => self.retry,
            Bucket::Nonexistent => self.nonexistent,
            Bucket::HardRejected => self.hard_rejected,
        }
    }

    /// Sum of the four bucket counters
    pub fn bucket_total(&self) -> u64 {
        self.validated + self.retry + self.nonexistent + self.hard_rejected
    }

    pub fn target_reached(&self) -> bool {
        self.target.is_some_and(|t| self.validated >= t)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Mean wall time per processed word, milliseconds
    pub fn avg_ms_per_word(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.elapsed().as_secs_f64() * 1000.0 / self.processed as f64
        }
    }

    fn target_display(&self) -> String {
        self.target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "∞".to_string())
    }

    /// Single-line progress snapshot
    pub fn display_string(&self) -> String {
        format!(
            "Processed:{}  Validated:{}/{}  Retry:{}  Nonexistent:{}  HardRejected:{}  \
             Elapsed:{:.1}s  Avg:{:.1}ms/word  Last:{}",
            self.processed,
            self.validated,
            self.target_display(),
            self.retry,
            self.nonexistent,
            self.hard_rejected,
            self.elapsed().as_secs_f64(),
            self.avg_ms_per_word(),
            self.last_word.as_deref().unwrap_or(""),
        )
    }
}
