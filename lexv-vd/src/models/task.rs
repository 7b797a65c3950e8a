//! Parsed input records

/// One candidate word to validate
///
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Normalised word (part-of-speech suffix stripped)
    pub word: String,
    pub frequency: u64,
    /// Input line as read, written back verbatim to the non-validated buckets
    pub source_line: String,
}

impl Task {
    pub fn new(word: impl Into<String>, frequency: u64, source_line: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            frequency,
            source_line: source_line.into(),
        }
    }
}

/// Output of the record parser for one accepted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRecord {
    /// Well-formed record that passed the length filter
    Task(Task),
    /// Line that could not be parsed; classified as hard-rejected
    Malformed {
        /// Leading field, or the whole line when there is no comma
        word: String,
        source_line: String,
        detail: String,
    },
}
