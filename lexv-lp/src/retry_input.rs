//! Next-pass input construction
//!
//! The hard-rejected bucket `R<name>` and the nonexistent bucket `N<name>`
//! are merged back into `R<name>` as a clean `term,term_frequency` file.

use crate::error::LoopResult;
use lexv_common::buckets::{read_bucket_records, BucketPaths, BucketRecord};
use lexv_common::terms::CANONICAL_HEADER;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

/// Merge `R<name>` and `N<name>` into `R<name>`, returning its path and size
///
/// Only the first two fields survive. Words are deduplicated on their
/// normalised form, keeping the highest frequency (first seen on ties).
/// Output is sorted by descending frequency, then word, so a frequency floor
/// still stops correctly on the next pass.
pub async fn build_retry_input(buckets: &BucketPaths) -> LoopResult<(PathBuf, usize)> {
    let mut records = read_bucket_records(&buckets.hard_rejected).await?;
    records.extend(read_bucket_records(&buckets.nonexistent).await?);

    let merged = merge_records(records);

    let mut body = String::with_capacity(merged.len() * 16 + CANONICAL_HEADER.len() + 1);
    body.push_str(CANONICAL_HEADER);
    body.push('\n');
    for record in &merged {
        body.push_str(&format!("{},{}\n", record.term, record.frequency));
    }
    tokio::fs::write(&buckets.hard_rejected, body).await?;

    info!(
        path = %buckets.hard_rejected.display(),
        words = merged.len(),
        "Wrote retry input"
    );
    Ok((buckets.hard_rejected.clone(), merged.len()))
}

fn merge_records(records: Vec<BucketRecord>) -> Vec<BucketRecord> {
    let mut best: HashMap<String, BucketRecord> = HashMap::new();
    for record in records {
        let key = record.word().to_string();
        match best.get(&key) {
            Some(kept) if kept.frequency >= record.frequency => {}
            _ => {
                best.insert(key, record);
            }
        }
    }

    let mut merged: Vec<BucketRecord> = best.into_values().collect();
    merged.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.word().cmp(b.word()))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_duplicate_keeps_highest_frequency() {
        let dir = TempDir::new().unwrap();
        let buckets = BucketPaths::for_input(&dir.path().join("words.csv"));
        std::fs::write(&buckets.hard_rejected, "run,5,rate_limited\n").unwrap();
        std::fs::write(&buckets.nonexistent, "run,9\n").unwrap();

        let (path, count) = build_retry_input(&buckets).await.unwrap();

        assert_eq!(path, buckets.hard_rejected);
        assert_eq!(count, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "term,term_frequency\nrun,9\n"
        );
    }

    #[tokio::test]
    async fn test_extra_columns_dropped_and_sorted() {
        let dir = TempDir::new().unwrap();
        let buckets = BucketPaths::for_input(&dir.path().join("words.csv"));
        std::fs::write(
            &buckets.hard_rejected,
            "term,term_frequency\nbusy,30,rate_limited\nbad,lots,parse_error\noops,300,http_503\n",
        )
        .unwrap();
        std::fs::write(&buckets.nonexistent, "xyzzy,30\nwalk_VERB,40,extra\nwalk,12\n").unwrap();

        let (path, count) = build_retry_input(&buckets).await.unwrap();

        assert_eq!(count, 4);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "term,term_frequency\noops,300\nwalk_VERB,40\nbusy,30\nxyzzy,30\n"
        );
    }

    #[tokio::test]
    async fn test_missing_buckets_give_header_only() {
        let dir = TempDir::new().unwrap();
        let buckets = BucketPaths::for_input(Path::new(&dir.path().join("empty.csv")));

        let (path, count) = build_retry_input(&buckets).await.unwrap();
        assert_eq!(count, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "term,term_frequency\n");
    }
}
