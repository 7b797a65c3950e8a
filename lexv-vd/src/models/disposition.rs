//! Terminal classification of a task
//!
//! Every task reaching classification gets exactly one `Disposition`; the
//! four variants map one-to-one onto the four output buckets.

use std::fmt;

/// Output bucket a disposition is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Validated,
    Retry,
    Nonexistent,
    HardRejected,
}

impl Bucket {
    /// Tag prefixed to diagnostic lines in streaming mode
    pub fn tag(&self) -> &'static str {
        match self {
            Bucket::Validated => "VALIDATED",
            Bucket::Retry => "RETRY",
            Bucket::Nonexistent => "NONEXISTENT",
            Bucket::HardRejected => "HARD_REJECTED",
        }
    }
}

/// Why a task belongs in the retry bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// A probe failed at transport level (includes timeouts)
    Exception,
    /// Page exists but lacks the requested locale section
    WrongLocale,
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryReason::Exception => write!(f, "exception"),
            RetryReason::WrongLocale => write!(f, "wrong_locale"),
        }
    }
}

/// Why a task was hard-rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    RateLimited,
    /// 5xx or other unexpected HTTP status
    Http(u16),
    UnexpectedResponse,
    ParseError,
    /// Wrong-locale pages when configured to reject them
    WrongLocale,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::RateLimited => write!(f, "rate_limited"),
            RejectReason::Http(code) => write!(f, "http_{}", code),
            RejectReason::UnexpectedResponse => write!(f, "unexpected_response"),
            RejectReason::ParseError => write!(f, "parse_error"),
            RejectReason::WrongLocale => write!(f, "wrong_locale"),
        }
    }
}

/// Terminal outcome of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Validated {
        word: String,
        frequency: u64,
        parts_of_speech: Vec<String>,
        additional_tags: Vec<String>,
    },
    Retry {
        word: String,
        frequency: u64,
        source_line: String,
        reason: RetryReason,
    },
    Nonexistent {
        word: String,
        frequency: u64,
        source_line: String,
    },
    HardRejected {
        word: String,
        frequency: u64,
        source_line: String,
        reason: RejectReason,
    },
}

impl Disposition {
    pub fn bucket(&self) -> Bucket {
        match self {
            Disposition::Validated { .. } => Bucket::Validated,
            Disposition::Retry { .. } => Bucket::Retry,
            Disposition::Nonexistent { .. } => Bucket::Nonexistent,
            Disposition::HardRejected { .. } => Bucket::HardRejected,
        }
    }

    pub fn word(&self) -> &str {
        match self {
            Disposition::Validated { word, .. }
            | Disposition::Retry { word, .. }
            | Disposition::Nonexistent { word, .. }
            | Disposition::HardRejected { word, .. } => word,
        }
    }

    /// Bucket line, without trailing newline
    ///
    /// Validated: `word,frequency,PoS1,...,PoSn,tag1;tag2` (last field always
    /// present). Nonexistent: source line. Others: `source_line,reason`.
    pub fn to_line(&self) -> String {
        match self {
            Disposition::Validated {
                word,
                frequency,
                parts_of_speech,
                additional_tags,
            } => {
                let mut fields = Vec::with_capacity(parts_of_speech.len() + 3);
                fields.push(word.clone());
                fields.push(frequency.to_string());
                fields.extend(parts_of_speech.iter().cloned());
                fields.push(additional_tags.join(";"));
                fields.join(",")
            }
            Disposition::Retry {
                source_line,
                reason,
                ..
            } => format!("{},{}", source_line, reason),
            Disposition::Nonexistent { source_line, .. } => source_line.clone(),
            Disposition::HardRejected {
                source_line,
                reason,
                ..
            } => format!("{},{}", source_line, reason),
        }
    }
}
