//! Batch executor driving one transfer strategy across a file list.
//!
//! Files are processed in fixed-size windows: every transfer in a window runs
//! concurrently, and the next window starts once the whole window has settled.
//! Each file is retried independently with exponential backoff, and every
//! input file yields exactly one [`TransferOutcome`].
//!
//! # Example
//!
//! ```no_run
//! use artifact_downloader_core::download::{
//!     BatchExecutor, HttpClient, PresignedTransfer, RetryPolicy,
//! };
//! use artifact_downloader_core::api::FileManifestEntry;
//! use std::path::Path;
//!
//! # async fn example(files: Vec<FileManifestEntry>) -> Result<(), Box<dyn std::error::Error>> {
//! let transfer = PresignedTransfer::new(HttpClient::new()?);
//! let executor = BatchExecutor::new(10, RetryPolicy::default())?;
//! let result = executor.run(&files, Path::new("./dist"), &transfer).await;
//! println!("Succeeded: {}, Failed: {}", result.success.len(), result.failed.len());
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::output_path::resolve_output_path;
use super::retry::{RetryDecision, RetryPolicy};
use super::{Transfer, TransferError};
use crate::api::FileManifestEntry;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Progress is reported whenever the completed count reaches a multiple of this.
const PROGRESS_INTERVAL: usize = 100;

/// Error type for batch executor construction.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// A file that could not be transferred, with the error of its last attempt.
#[derive(Debug)]
pub struct FailedTransfer {
    /// Manifest path of the file.
    pub path: String,
    /// Number of attempts made.
    pub attempts: u32,
    /// Error from the final attempt.
    pub error: TransferError,
}

/// Result of transferring one file.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The file was written; carries its manifest path.
    Succeeded {
        /// Manifest path of the file.
        path: String,
        /// Number of attempts made.
        attempts: u32,
    },
    /// Every allowed attempt failed.
    Failed(FailedTransfer),
}

impl TransferOutcome {
    /// Manifest path of the file this outcome belongs to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Succeeded { path, .. } | Self::Failed(FailedTransfer { path, .. }) => path,
        }
    }

    fn retries(&self) -> usize {
        let attempts = match self {
            Self::Succeeded { attempts, .. } | Self::Failed(FailedTransfer { attempts, .. }) => {
                *attempts
            }
        };
        attempts.saturating_sub(1) as usize
    }
}

/// Aggregated outcomes of a batch.
///
/// `success.len() + failed.len()` always equals the number of input files.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Manifest paths that were written.
    pub success: Vec<String>,
    /// Files that failed after exhausting retries.
    pub failed: Vec<FailedTransfer>,
    /// Retry attempts made across all files.
    pub retried: usize,
}

impl BatchResult {
    /// Number of files accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len()
    }

    fn record(&mut self, outcome: TransferOutcome) {
        self.retried += outcome.retries();
        match outcome {
            TransferOutcome::Succeeded { path, .. } => self.success.push(path),
            TransferOutcome::Failed(failure) => self.failed.push(failure),
        }
    }
}

/// Runs a transfer strategy over a list of files with bounded concurrency.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    /// Window size.
    concurrency: usize,
    /// Retry policy applied to each file.
    retry_policy: RetryPolicy,
}

impl BatchExecutor {
    /// Creates an executor with the given window size and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    ///
    /// # Example
    ///
    /// ```
    /// use artifact_downloader_core::download::{BatchExecutor, RetryPolicy};
    ///
    /// let executor = BatchExecutor::new(10, RetryPolicy::default()).unwrap();
    /// assert_eq!(executor.concurrency(), 10);
    /// ```
    pub fn new(concurrency: usize, retry_policy: RetryPolicy) -> Result<Self, ExecutorError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ExecutorError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            max_attempts = retry_policy.max_attempts(),
            "creating batch executor"
        );

        Ok(Self {
            concurrency,
            retry_policy,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Transfers every file in `files` into `output_dir` using `transfer`.
    ///
    /// Individual failures never abort sibling transfers; they are collected
    /// in [`BatchResult::failed`].
    #[instrument(skip(self, files, transfer), fields(files = files.len(), strategy = transfer.name(), output_dir = %output_dir.display()))]
    pub async fn run(
        &self,
        files: &[FileManifestEntry],
        output_dir: &Path,
        transfer: &dyn Transfer,
    ) -> BatchResult {
        let total = files.len();
        let mut result = BatchResult::default();

        for window in files.chunks(self.concurrency) {
            let outcomes = join_all(
                window
                    .iter()
                    .map(|entry| self.transfer_with_retry(entry, output_dir, transfer)),
            )
            .await;

            for outcome in outcomes {
                result.record(outcome);
            }

            let completed = result.total();
            if should_report_progress(completed, total) {
                info!(completed, total, "download progress");
            }
        }

        debug!(
            succeeded = result.success.len(),
            failed = result.failed.len(),
            retried = result.retried,
            "batch complete"
        );

        result
    }

    /// Transfers one file, retrying per the policy. Attempts are sequential.
    async fn transfer_with_retry(
        &self,
        entry: &FileManifestEntry,
        output_dir: &Path,
        transfer: &dyn Transfer,
    ) -> TransferOutcome {
        let output_path = match resolve_output_path(output_dir, &entry.path) {
            Ok(path) => path,
            Err(error) => {
                return TransferOutcome::Failed(FailedTransfer {
                    path: entry.path.clone(),
                    attempts: 0,
                    error,
                });
            }
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            debug!(path = %entry.path, attempt, "attempting transfer");

            match transfer.fetch(entry, &output_path).await {
                Ok(bytes) => {
                    debug!(path = %entry.path, bytes, attempt, "transfer complete");
                    return TransferOutcome::Succeeded {
                        path: entry.path.clone(),
                        attempts: attempt,
                    };
                }
                Err(error) => match self.retry_policy.should_retry(&error, attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        info!(
                            path = %entry.path,
                            attempt = next_attempt,
                            max_attempts = self.retry_policy.max_attempts(),
                            delay_ms = delay.as_millis(),
                            error = %error,
                            "retrying transfer"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        warn!(
                            path = %entry.path,
                            attempts = attempt,
                            %reason,
                            error = %error,
                            "transfer failed"
                        );
                        return TransferOutcome::Failed(FailedTransfer {
                            path: entry.path.clone(),
                            attempts: attempt,
                            error,
                        });
                    }
                },
            }
        }
    }
}

/// Progress is reported at every multiple of the interval and at the end.
fn should_report_progress(completed: usize, total: usize) -> bool {
    completed % PROGRESS_INTERVAL == 0 || completed == total
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;

    fn entry(path: &str) -> FileManifestEntry {
        FileManifestEntry {
            path: path.to_string(),
            size: 1,
            download_url: None,
        }
    }

    /// Fails each path a scripted number of times, then writes it.
    #[derive(Default)]
    struct ScriptedTransfer {
        failures: HashMap<String, usize>,
        calls: Mutex<HashMap<String, usize>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedTransfer {
        fn failing(failures: &[(&str, usize)]) -> Self {
            Self {
                failures: failures
                    .iter()
                    .map(|(path, count)| ((*path).to_string(), *count))
                    .collect(),
                ..Self::default()
            }
        }

        fn calls(&self, path: &str) -> usize {
            self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl Transfer for ScriptedTransfer {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(
            &self,
            entry: &FileManifestEntry,
            output_path: &Path,
        ) -> Result<u64, TransferError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let call = {
                let mut calls = self.calls.lock().unwrap();
                let count = calls.entry(entry.path.clone()).or_insert(0);
                *count += 1;
                *count
            };

            if call <= self.failures.get(&entry.path).copied().unwrap_or(0) {
                return Err(TransferError::http_status(
                    format!("https://storage.example.com/{}", entry.path),
                    503,
                ));
            }

            tokio::fs::create_dir_all(output_path.parent().unwrap())
                .await
                .unwrap();
            tokio::fs::write(output_path, b"x").await.unwrap();
            Ok(1)
        }
    }

    #[test]
    fn test_executor_new_valid_concurrency() {
        assert_eq!(BatchExecutor::new(1, RetryPolicy::default()).unwrap().concurrency(), 1);
        assert_eq!(BatchExecutor::new(10, RetryPolicy::default()).unwrap().concurrency(), 10);
        assert_eq!(BatchExecutor::new(100, RetryPolicy::default()).unwrap().concurrency(), 100);
    }

    #[test]
    fn test_executor_new_invalid_concurrency() {
        assert!(matches!(
            BatchExecutor::new(0, RetryPolicy::default()),
            Err(ExecutorError::InvalidConcurrency { value: 0 })
        ));
        assert!(matches!(
            BatchExecutor::new(101, RetryPolicy::default()),
            Err(ExecutorError::InvalidConcurrency { value: 101 })
        ));
    }

    #[test]
    fn test_should_report_progress_at_interval_multiples_and_end() {
        assert!(should_report_progress(100, 250));
        assert!(should_report_progress(200, 250));
        assert!(should_report_progress(250, 250));
        assert!(!should_report_progress(90, 250));
        assert!(!should_report_progress(150, 250));
    }

    #[test]
    fn test_should_report_progress_with_windows_not_aligned_to_interval() {
        // Windows of 30 over 300 files: 30, 60, ..., 300 never hits 100 or 200.
        let reported: Vec<usize> = (30..=300)
            .step_by(30)
            .filter(|&completed| should_report_progress(completed, 300))
            .collect();
        assert_eq!(reported, vec![300]);
    }

    #[test]
    fn test_executor_error_display() {
        let msg = ExecutorError::InvalidConcurrency { value: 0 }.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_default_concurrency_constant() {
        assert_eq!(DEFAULT_CONCURRENCY, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_file_gets_exactly_one_outcome() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..23).map(|i| entry(&format!("f{i}.txt"))).collect();
        let transfer = ScriptedTransfer::failing(&[("f3.txt", 9), ("f17.txt", 9)]);
        let executor = BatchExecutor::new(4, RetryPolicy::new(2, Duration::from_secs(1))).unwrap();

        let result = executor.run(&files, temp_dir.path(), &transfer).await;

        assert_eq!(result.total(), files.len());
        assert_eq!(result.success.len(), 21);
        let mut failed: Vec<_> = result.failed.iter().map(|f| f.path.as_str()).collect();
        failed.sort_unstable();
        assert_eq!(failed, ["f17.txt", "f3.txt"]);
        assert_eq!(result.retried, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_peak_concurrency_bounded_by_window() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..12).map(|i| entry(&format!("f{i}"))).collect();
        let transfer = ScriptedTransfer::default();
        let executor = BatchExecutor::new(3, RetryPolicy::default()).unwrap();

        executor.run(&files, temp_dir.path(), &transfer).await;

        assert_eq!(transfer.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_with_doubling_backoff() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![entry("flaky.js")];
        let transfer = ScriptedTransfer::failing(&[("flaky.js", 2)]);
        let executor = BatchExecutor::new(10, RetryPolicy::default()).unwrap();

        let started = tokio::time::Instant::now();
        let result = executor.run(&files, temp_dir.path(), &transfer).await;
        let elapsed = started.elapsed();

        assert_eq!(result.success, ["flaky.js"]);
        assert!(result.failed.is_empty());
        assert_eq!(transfer.calls("flaky.js"), 3);
        // 1s + 2s of backoff plus three 5ms transfers
        assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_attempt_error_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![entry("broken.css")];
        let transfer = ScriptedTransfer::failing(&[("broken.css", 5)]);
        let executor = BatchExecutor::new(10, RetryPolicy::default()).unwrap();

        let result = executor.run(&files, temp_dir.path(), &transfer).await;

        assert!(result.success.is_empty());
        let failure = &result.failed[0];
        assert_eq!(failure.path, "broken.css");
        assert_eq!(failure.attempts, 3);
        assert!(matches!(failure.error, TransferError::HttpStatus { status: 503, .. }));
        assert_eq!(transfer.calls("broken.css"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsafe_path_fails_without_transfer_attempt() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![entry("../escape.txt"), entry("ok.txt")];
        let transfer = ScriptedTransfer::default();
        let executor = BatchExecutor::new(10, RetryPolicy::default()).unwrap();

        let result = executor.run(&files, temp_dir.path(), &transfer).await;

        assert_eq!(result.success, ["ok.txt"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].attempts, 0);
        assert!(matches!(result.failed[0].error, TransferError::UnsafePath { .. }));
        assert_eq!(transfer.calls("../escape.txt"), 0);
    }

    #[tokio::test]
    async fn test_empty_file_list_yields_empty_result() {
        let temp_dir = TempDir::new().unwrap();
        let transfer = ScriptedTransfer::default();
        let executor = BatchExecutor::new(10, RetryPolicy::default()).unwrap();

        let result = executor.run(&[], temp_dir.path(), &transfer).await;

        assert_eq!(result.total(), 0);
        assert_eq!(result.retried, 0);
    }
}
