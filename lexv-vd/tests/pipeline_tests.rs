//! End-to-end validation passes over on-disk fixtures with a stub lookup

use async_trait::async_trait;
use clap::Parser;
use lexv_common::config::TomlConfig;
use lexv_vd::models::{ProbeResult, ProbeStatus};
use lexv_vd::services::LexicalLookup;
use lexv_vd::{pipeline, InputSource, ValidatorArgs, ValidatorConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Canned probe results keyed by literal word form; unknown words are 404
#[derive(Default)]
struct StubLookup {
    pages: HashMap<String, ProbeResult>,
    seen: Mutex<Vec<String>>,
}

impl StubLookup {
    fn with(mut self, word: &str, pos: &[&str], tags: &[&str]) -> Self {
        self.pages.insert(
            word.to_string(),
            ProbeResult::found(
                word,
                pos.iter().map(|s| s.to_string()).collect(),
                tags.iter().map(|s| s.to_string()).collect(),
            ),
        );
        self
    }

    fn with_status(mut self, word: &str, status: ProbeStatus) -> Self {
        self.pages
            .insert(word.to_string(), ProbeResult::status_only(word, status));
        self
    }
}

#[async_trait]
impl LexicalLookup for StubLookup {
    async fn probe(&self, word: &str, _locale: &str) -> ProbeResult {
        self.seen.lock().unwrap().push(word.to_string());
        self.pages
            .get(word)
            .cloned()
            .unwrap_or_else(|| ProbeResult::status_only(word, ProbeStatus::NotFound))
    }
}

fn write_input(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn config_for(input: &Path, extra: &[&str]) -> ValidatorConfig {
    let input = input.display().to_string();
    let mut argv = vec!["lexv-vd", "en", input.as_str()];
    argv.extend_from_slice(extra);
    let args = ValidatorArgs::try_parse_from(argv).unwrap();
    let mut config = ValidatorConfig::resolve(&args, &TomlConfig::default()).unwrap();
    config.scheduler.show_progress = false;
    config
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn buckets(config: &ValidatorConfig) -> lexv_common::buckets::BucketPaths {
    match &config.input {
        InputSource::File { buckets, .. } => buckets.clone(),
        InputSource::Stdin => panic!("file input expected"),
    }
}

#[tokio::test]
async fn test_run_and_foo_scenario() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "words.csv", "term,term_frequency\nrun,1000\nfoo,10\n");
    let config = config_for(&input, &[]);
    let lookup = Arc::new(StubLookup::default().with("run", &["NOUN", "VERB"], &[]));

    let stats = pipeline::run_with_lookup(&config, lookup).await.unwrap();

    let paths = buckets(&config);
    assert_eq!(read(&paths.validated), "run,1000,NOUN,VERB,\n");
    assert_eq!(read(&paths.nonexistent), "foo,10\n");
    assert_eq!(read(&paths.hard_rejected), "");
    assert_eq!(read(&paths.retry), "");
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.validated, 1);
    assert_eq!(stats.nonexistent, 1);
}

#[tokio::test]
async fn test_bucket_counts_conserve_filtered_tasks() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "mixed.csv",
        "term,term_frequency\n\
         walk_VERB,900\n\
         a,800\n\
         bonjour,700\n\
         busy,600\n\
         flaky,500\n\
         qwzx,400\n\
         bad,lots\n\
         oops,300\n",
    );
    let config = config_for(&input, &["--min", "2"]);
    let lookup = Arc::new(
        StubLookup::default()
            .with("walk", &["VERB"], &["INF"])
            .with_status("bonjour", ProbeStatus::Ok)
            .with_status("busy", ProbeStatus::RateLimited)
            .with_status("flaky", ProbeStatus::TransportFailure)
            .with_status("oops", ProbeStatus::ServerError(503)),
    );

    let stats = pipeline::run_with_lookup(&config, lookup.clone()).await.unwrap();

    // "a" is below the length floor and never dispatched
    assert_eq!(stats.processed, 7);
    assert_eq!(stats.bucket_total(), stats.processed);
    assert!(!lookup.seen.lock().unwrap().contains(&"a".to_string()));

    let paths = buckets(&config);
    assert_eq!(read(&paths.validated), "walk,900,VERB,INF\n");
    assert_eq!(read(&paths.nonexistent), "qwzx,400\n");

    let mut retry: Vec<String> = read(&paths.retry).lines().map(String::from).collect();
    retry.sort();
    assert_eq!(retry, vec!["bonjour,700,wrong_locale", "flaky,500,exception"]);

    let mut rejected: Vec<String> = read(&paths.hard_rejected).lines().map(String::from).collect();
    rejected.sort();
    assert_eq!(
        rejected,
        vec!["bad,lots,parse_error", "busy,600,rate_limited", "oops,300,http_503"]
    );
}

#[tokio::test]
async fn test_frequency_floor_stops_on_sorted_assumption() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "floor.csv", "a,500\nb,90\nc,700\n");
    let config = config_for(&input, &["--min-frequency", "100"]);
    let lookup = Arc::new(
        StubLookup::default()
            .with("a", &["NOUN"], &[])
            .with("b", &["NOUN"], &[])
            .with("c", &["NOUN"], &[]),
    );

    let stats = pipeline::run_with_lookup(&config, lookup.clone()).await.unwrap();

    assert_eq!(stats.processed, 1);
    assert_eq!(*lookup.seen.lock().unwrap(), vec!["a".to_string()]);
    assert_eq!(read(&buckets(&config).validated), "a,500,NOUN,\n");
}

#[tokio::test]
async fn test_dual_probe_writes_one_line_per_word() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "cap.csv", "turkey,50\nparis,40\n");
    let config = config_for(&input, &["--cap"]);
    let lookup = Arc::new(
        StubLookup::default()
            .with("turkey", &["NOUN"], &["SINGULAR"])
            .with("Turkey", &["PROPER NOUN"], &["SINGULAR"])
            .with("Paris", &["PROPER NOUN"], &[]),
    );

    let stats = pipeline::run_with_lookup(&config, lookup).await.unwrap();
    assert_eq!(stats.validated, 2);

    let mut validated: Vec<String> = read(&buckets(&config).validated).lines().map(String::from).collect();
    validated.sort();
    assert_eq!(
        validated,
        vec!["paris,40,PROPER NOUN,", "turkey,50,NOUN,PROPER NOUN,SINGULAR"]
    );
}

#[tokio::test]
async fn test_size_target_stops_early_and_succeeds() {
    let dir = TempDir::new().unwrap();
    let body: String = (0..300).map(|i| format!("w{},{}\n", i, 1000 - i)).collect();
    let input = write_input(&dir, "big.csv", &body);
    let config = config_for(&input, &["--size", "10", "--workers", "2"]);

    let mut lookup = StubLookup::default();
    for i in 0..300 {
        lookup = lookup.with(&format!("w{}", i), &["NOUN"], &[]);
    }

    let stats = pipeline::run_with_lookup(&config, Arc::new(lookup)).await.unwrap();

    assert!(stats.validated >= 10);
    assert!(stats.validated <= 12, "only in-flight work drains");
    assert_eq!(
        read(&buckets(&config).validated).lines().count() as u64,
        stats.validated
    );
}

#[tokio::test]
async fn test_reset_clears_previous_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "words.csv", "run,1000\n");
    std::fs::write(dir.path().join("words-VALIDATED.csv"), "stale,1,NOUN,\n").unwrap();
    std::fs::write(dir.path().join("Nwords.csv"), "gone,1\n").unwrap();

    let config = config_for(&input, &["--reset"]);
    let lookup = Arc::new(StubLookup::default().with("run", &["VERB"], &[]));
    pipeline::run_with_lookup(&config, lookup).await.unwrap();

    assert_eq!(read(&dir.path().join("words-VALIDATED.csv")), "run,1000,VERB,\n");
    assert_eq!(read(&dir.path().join("Nwords.csv")), "");
}

#[tokio::test]
async fn test_without_reset_appends() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "words.csv", "run,1000\n");
    std::fs::write(dir.path().join("words-VALIDATED.csv"), "kept,1,NOUN,\n").unwrap();

    let config = config_for(&input, &[]);
    let lookup = Arc::new(StubLookup::default().with("run", &["VERB"], &[]));
    pipeline::run_with_lookup(&config, lookup).await.unwrap();

    assert_eq!(
        read(&dir.path().join("words-VALIDATED.csv")),
        "kept,1,NOUN,\nrun,1000,VERB,\n"
    );
}

#[tokio::test]
async fn test_out_override_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "words.csv", "run,1000\n");
    let config = config_for(&input, &["--out", "good.csv"]);
    let lookup = Arc::new(StubLookup::default().with("run", &["VERB"], &[]));

    pipeline::run_with_lookup(&config, lookup).await.unwrap();

    assert_eq!(read(&dir.path().join("good.csv")), "run,1000,VERB,\n");
    assert!(!dir.path().join("words-VALIDATED.csv").exists());
}

#[tokio::test]
async fn test_undecodable_line_is_rejected_and_pass_continues() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("w.csv");
    std::fs::write(&input, b"run,1000\ncaf\xe9,500\nwalk,100\n").unwrap();
    let config = config_for(&input, &[]);
    let lookup = Arc::new(
        StubLookup::default()
            .with("run", &["VERB"], &[])
            .with("walk", &["VERB"], &[]),
    );

    let stats = pipeline::run_with_lookup(&config, lookup).await.unwrap();

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.validated, 2);
    assert_eq!(stats.hard_rejected, 1);
    let paths = buckets(&config);
    assert_eq!(read(&paths.hard_rejected), "caf\u{FFFD},500,parse_error\n");
    let mut validated: Vec<String> = read(&paths.validated).lines().map(String::from).collect();
    validated.sort();
    assert_eq!(validated, vec!["run,1000,VERB,", "walk,100,VERB,"]);
}
