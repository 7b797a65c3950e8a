//! Convergence loop driven by a scripted pass runner writing bucket fixtures

use async_trait::async_trait;
use lexv_common::buckets::BucketPaths;
use lexv_lp::{ConvergenceLoop, LoopError, LoopResult, PassRunner, StopReason};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Bucket contents to produce on one pass
struct PassScript {
    hard_rejected: &'static str,
    nonexistent: &'static str,
}

/// Writes the next scripted buckets next to whatever input it is handed
struct ScriptedRunner {
    script: Vec<PassScript>,
    inputs: Mutex<Vec<(PathBuf, String)>>,
    fail_on: Option<u32>,
}

impl ScriptedRunner {
    fn new(script: Vec<PassScript>) -> Self {
        Self {
            script,
            inputs: Mutex::new(Vec::new()),
            fail_on: None,
        }
    }

    fn inputs(&self) -> Vec<(PathBuf, String)> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PassRunner for ScriptedRunner {
    async fn run_pass(&self, pass: u32, input: &Path) -> LoopResult<()> {
        if self.fail_on == Some(pass) {
            return Err(LoopError::PassFailed {
                pass,
                status: "exit status: 2".to_string(),
            });
        }
        let content = std::fs::read_to_string(input).unwrap();
        self.inputs.lock().unwrap().push((input.to_path_buf(), content));

        let idx = (pass as usize - 1).min(self.script.len() - 1);
        let step = &self.script[idx];
        let buckets = BucketPaths::for_input(input);
        std::fs::write(&buckets.validated, "").unwrap();
        std::fs::write(&buckets.hard_rejected, step.hard_rejected).unwrap();
        std::fs::write(&buckets.nonexistent, step.nonexistent).unwrap();
        std::fs::write(&buckets.retry, "").unwrap();
        Ok(())
    }
}

fn seed(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("words.csv");
    std::fs::write(&path, body).unwrap();
    path
}

fn lp(runner: ScriptedRunner, max_passes: Option<u32>) -> ConvergenceLoop<ScriptedRunner> {
    ConvergenceLoop::new(runner, Duration::ZERO, max_passes)
}

#[tokio::test]
async fn test_stops_after_first_pass_without_hard_failures() {
    let dir = TempDir::new().unwrap();
    let input = seed(&dir, "term,term_frequency\nrun,1000\nfoo,10\n");
    let runner = ScriptedRunner::new(vec![PassScript {
        hard_rejected: "",
        nonexistent: "foo,10\n",
    }]);

    let outcome = lp(runner, None).run(input.clone()).await.unwrap();

    assert_eq!(outcome.passes, 1);
    assert_eq!(outcome.reason, StopReason::NoHardFailures);
    assert_eq!(outcome.final_input, input);
}

#[tokio::test]
async fn test_stable_nonexistent_compared_as_sets() {
    let dir = TempDir::new().unwrap();
    let input = seed(&dir, "run,50\nxyzzy,20\nqwzx,10\n");
    let runner = ScriptedRunner::new(vec![
        PassScript {
            hard_rejected: "run,50,rate_limited\n",
            nonexistent: "xyzzy,20\nqwzx,10\n",
        },
        PassScript {
            hard_rejected: "run,50,http_503\n",
            nonexistent: "qwzx,10\nxyzzy,20\n",
        },
    ]);

    let outcome = lp(runner, None).run(input).await.unwrap();

    assert_eq!(outcome.passes, 2);
    assert_eq!(outcome.reason, StopReason::StableNonexistent);
    assert_eq!(outcome.final_input, dir.path().join("Rwords.csv"));
}

#[tokio::test]
async fn test_retry_input_feeds_next_pass() {
    let dir = TempDir::new().unwrap();
    let input = seed(&dir, "run,9\nbusy,7\n");
    let runner = ScriptedRunner::new(vec![
        PassScript {
            hard_rejected: "run,5,rate_limited\nbusy,7,http_500\n",
            nonexistent: "run,9\n",
        },
        PassScript {
            hard_rejected: "",
            nonexistent: "",
        },
    ]);

    let looper = lp(runner, None);
    let outcome = looper.run(input).await.unwrap();
    assert_eq!(outcome.passes, 2);
    assert_eq!(outcome.reason, StopReason::NoHardFailures);

    let inputs = looper.runner().inputs();
    assert_eq!(inputs[1].0, dir.path().join("Rwords.csv"));
    assert_eq!(inputs[1].1, "term,term_frequency\nrun,9\nbusy,7\n");
}

#[tokio::test]
async fn test_pass_limit_stops_oscillation() {
    let dir = TempDir::new().unwrap();
    let input = seed(&dir, "a,3\nb,2\n");
    let runner = ScriptedRunner::new(vec![
        PassScript {
            hard_rejected: "a,3,rate_limited\n",
            nonexistent: "b,2\n",
        },
        PassScript {
            hard_rejected: "b,2,rate_limited\n",
            nonexistent: "a,3\n",
        },
        PassScript {
            hard_rejected: "a,3,rate_limited\n",
            nonexistent: "b,2\n",
        },
    ]);

    let looper = lp(runner, Some(3));
    let outcome = looper.run(input).await.unwrap();

    assert_eq!(outcome.passes, 3);
    assert_eq!(outcome.reason, StopReason::PassLimit);
    assert_eq!(looper.runner().inputs().len(), 3);
}

#[tokio::test]
async fn test_failed_pass_aborts_loop() {
    let dir = TempDir::new().unwrap();
    let input = seed(&dir, "a,3\n");
    let mut runner = ScriptedRunner::new(vec![PassScript {
        hard_rejected: "a,3,rate_limited\n",
        nonexistent: "",
    }]);
    runner.fail_on = Some(2);

    let err = lp(runner, None).run(input).await.unwrap_err();
    assert!(matches!(err, LoopError::PassFailed { pass: 2, .. }));
}
