//! Bucket file naming and reading
//!
//! For an input `foo.csv` one validation pass produces, next to the input:
//!
//! | Bucket | File |
//! |---|---|
//! | Validated | `foo-VALIDATED.csv` |
//! | Nonexistent | `Nfoo.csv` |
//! | Hard-rejected | `Rfoo.csv` |
//! | Retry | `foo-REJECTED.csv` |

use crate::terms::{is_header, leading_fields, normalize_term};
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Literal input name standing in for standard input
pub const STDIN_MARKER: &str = "-";

/// Output artifacts derived from one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPaths {
    pub validated: PathBuf,
    pub nonexistent: PathBuf,
    pub hard_rejected: PathBuf,
    pub retry: PathBuf,
}

impl BucketPaths {
    /// Default artifact names for `input`
    pub fn for_input(input: &Path) -> Self {
        let dir = input_dir(input);
        let root = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            validated: dir.join(format!("{}-VALIDATED.csv", root)),
            nonexistent: dir.join(format!("N{}.csv", root)),
            hard_rejected: dir.join(format!("R{}.csv", root)),
            retry: dir.join(format!("{}-REJECTED.csv", root)),
        }
    }

    /// Default names with the validated path overridden
    ///
    /// A bare file name is placed next to the input file.
    pub fn with_validated_override(input: &Path, validated: Option<&Path>) -> Self {
        let mut paths = Self::for_input(input);
        if let Some(out) = validated {
            paths.validated = if out.parent().map_or(true, |p| p.as_os_str().is_empty()) {
                input_dir(input).join(out)
            } else {
                out.to_path_buf()
            };
        }
        paths
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            &self.validated,
            &self.nonexistent,
            &self.hard_rejected,
            &self.retry,
        ]
    }
}

fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Normalise an input path: no extension gets `.csv`, other extensions are refused
pub fn ensure_csv_input_path(path: &Path) -> Result<PathBuf> {
    match path.extension() {
        None => {
            let mut with_ext = path.as_os_str().to_owned();
            with_ext.push(".csv");
            Ok(PathBuf::from(with_ext))
        }
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(path.to_path_buf()),
        Some(_) => Err(Error::InvalidInput(format!(
            "Input must be a .csv file (or omit extension). Got: {}",
            path.display()
        ))),
    }
}

/// Delete the default-named artifacts for `input`, ignoring missing files
pub async fn remove_artifacts(input: &Path) -> Result<()> {
    for path in BucketPaths::for_input(input).all() {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("Removed artifact {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// One `term,frequency` pair recovered from a bucket or input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRecord {
    /// Term as written, suffix included
    pub term: String,
    pub frequency: u64,
}

impl BucketRecord {
    /// Word used for set comparison and deduplication
    pub fn word(&self) -> &str {
        normalize_term(&self.term)
    }
}

/// Read the leading `term,frequency` of every line in a bucket file
///
/// Header, blank and unparsable lines are skipped. A missing file reads as
/// empty.
pub async fn read_bucket_records(path: &Path) -> Result<Vec<BucketRecord>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Bucket {} does not exist, treating as empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || is_header(line) {
            continue;
        }
        let parsed = leading_fields(line)
            .and_then(|(term, freq)| freq.parse::<u64>().ok().map(|f| (term, f)));
        match parsed {
            Some((term, frequency)) if !term.is_empty() => records.push(BucketRecord {
                term: term.to_string(),
                frequency,
            }),
            _ => debug!(line = %line, "Skipping unparsable bucket line"),
        }
    }
    Ok(records)
}

/// Set of normalised words in a bucket file, independent of line order
pub async fn read_bucket_words(path: &Path) -> Result<BTreeSet<String>> {
    Ok(read_bucket_records(path)
        .await?
        .iter()
        .map(|r| r.word().to_string())
        .collect())
}
