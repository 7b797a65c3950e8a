//! Probe classification
//!
//! Maps the one or two probe results of a task onto exactly one
//! [`Disposition`]. Pure and deterministic: identical probes always give
//! the same disposition with the same tag order.
//!
//! Decision order (first match wins):
//! 1. any probe raised an exception → Retry(`exception`)
//! 2. any probe OK with the locale section → Validated, PoS and tags merged
//! 3. any probe OK without the locale section → wrong locale, Retry or
//!    HardRejected per [`WrongLocalePolicy`]
//! 4. every probe NOT_FOUND → Nonexistent
//! 5. otherwise → HardRejected, `rate_limited` if any probe was, else the
//!    first other failure
//!
//! Rule 1 applies even when the sibling probe validated.

use crate::models::{Disposition, ParsedRecord, ProbeResult, ProbeStatus, RejectReason, RetryReason, Task};
use lexv_common::config::WrongLocalePolicy;

#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    wrong_locale: WrongLocalePolicy,
}

impl Classifier {
    pub fn new(wrong_locale: WrongLocalePolicy) -> Self {
        Self { wrong_locale }
    }

    pub fn classify(&self, task: &Task, probes: &[ProbeResult]) -> Disposition {
        if probes.iter().any(ProbeResult::raised_exception) {
            return self.retry(task, RetryReason::Exception);
        }

        if probes.iter().any(ProbeResult::is_validated) {
            let mut parts_of_speech = Vec::new();
            let mut additional_tags = Vec::new();
            for probe in probes.iter().filter(|p| p.is_validated()) {
                merge_ordered_unique(&mut parts_of_speech, &probe.parts_of_speech);
                merge_ordered_unique(&mut additional_tags, &probe.extracted_tags);
            }
            return Disposition::Validated {
                word: task.word.clone(),
                frequency: task.frequency,
                parts_of_speech,
                additional_tags,
            };
        }

        if probes.iter().any(ProbeResult::is_wrong_locale) {
            return match self.wrong_locale {
                WrongLocalePolicy::Retry => self.retry(task, RetryReason::WrongLocale),
                WrongLocalePolicy::Reject => self.reject(task, RejectReason::WrongLocale),
            };
        }

        if !probes.is_empty() && probes.iter().all(|p| p.status == ProbeStatus::NotFound) {
            return Disposition::Nonexistent {
                word: task.word.clone(),
                frequency: task.frequency,
                source_line: task.source_line.clone(),
            };
        }

        self.reject(task, hard_failure_reason(probes))
    }

    /// Disposition for a line the parser could not read
    pub fn classify_record(&self, record: &ParsedRecord) -> Option<Disposition> {
        match record {
            ParsedRecord::Task(_) => None,
            ParsedRecord::Malformed {
                word, source_line, ..
            } => Some(Disposition::HardRejected {
                word: word.clone(),
                frequency: 0,
                source_line: source_line.clone(),
                reason: RejectReason::ParseError,
            }),
        }
    }

    fn retry(&self, task: &Task, reason: RetryReason) -> Disposition {
        Disposition::Retry {
            word: task.word.clone(),
            frequency: task.frequency,
            source_line: task.source_line.clone(),
            reason,
        }
    }

    fn reject(&self, task: &Task, reason: RejectReason) -> Disposition {
        Disposition::HardRejected {
            word: task.word.clone(),
            frequency: task.frequency,
            source_line: task.source_line.clone(),
            reason,
        }
    }
}

fn hard_failure_reason(probes: &[ProbeResult]) -> RejectReason {
    if probes.iter().any(|p| p.status == ProbeStatus::RateLimited) {
        return RejectReason::RateLimited;
    }
    probes
        .iter()
        .find_map(|p| match p.status {
            ProbeStatus::ServerError(code) | ProbeStatus::OtherHttpError(code) => {
                Some(RejectReason::Http(code))
            }
            ProbeStatus::UnexpectedResponse => Some(RejectReason::UnexpectedResponse),
            _ => None,
        })
        .unwrap_or(RejectReason::UnexpectedResponse)
}

fn merge_ordered_unique(dst: &mut Vec<String>, src: &[String]) {
    for item in src {
        if !dst.contains(item) {
            dst.push(item.clone());
        }
    }
}
