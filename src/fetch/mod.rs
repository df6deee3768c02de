//! End-to-end orchestration of a deployment download.
//!
//! [`download_artifacts`] prepares the output directory, requests the
//! manifest, picks a transfer strategy from the server's capability flag,
//! runs the batch, and applies the failure threshold: the run fails only
//! when strictly more files failed than succeeded.

mod error;
mod output_dir;

pub use error::FetchError;

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::deployment::DeploymentTarget;
use crate::download::{
    BatchExecutor, DEFAULT_CONCURRENCY, FailedTransfer, HttpClient, HttpTimeouts,
    PresignedTransfer, ProxiedTransfer, RetryPolicy, Transfer,
};
use output_dir::prepare_output_dir;

/// Failures listed individually in the warning; the rest are only counted.
const MAX_REPORTED_FAILURES: usize = 10;

/// Everything a run needs.
#[derive(Clone)]
pub struct FetchConfig {
    /// Base URL of the deployment API.
    pub api_url: String,
    /// API key sent in the `X-API-Key` header.
    pub api_key: String,
    /// What to download.
    pub target: DeploymentTarget,
    /// Local directory receiving the files.
    pub output_path: PathBuf,
    /// Replace a non-empty output directory instead of failing.
    pub overwrite: bool,
    /// Transfers running at once.
    pub concurrency: usize,
    /// Per-file retry behavior.
    pub retry_policy: RetryPolicy,
    /// HTTP timeouts for every request.
    pub timeouts: HttpTimeouts,
}

impl std::fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("target", &self.target)
            .field("output_path", &self.output_path)
            .field("overwrite", &self.overwrite)
            .field("concurrency", &self.concurrency)
            .field("retry_policy", &self.retry_policy)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl FetchConfig {
    /// Creates a config with default concurrency, retries, and timeouts, and
    /// overwriting disabled.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        target: DeploymentTarget,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            target,
            output_path: output_path.into(),
            overwrite: false,
            concurrency: DEFAULT_CONCURRENCY,
            retry_policy: RetryPolicy::default(),
            timeouts: HttpTimeouts::default(),
        }
    }
}

/// Outcome of a successful (possibly partial) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    /// Commit the deployment resolved to.
    pub commit_sha: String,
    /// Number of files written.
    pub file_count: usize,
    /// Sum of all manifest entry sizes, including files that failed.
    pub total_size: u64,
    /// Manifest paths that were written.
    pub files: Vec<String>,
}

/// Downloads every file of `config.target` into `config.output_path`.
///
/// # Errors
///
/// Returns [`FetchError`] if the output directory is non-empty without
/// overwrite, the manifest request fails, or failed files outnumber
/// successful ones. Files already written are left in place in the last case.
#[instrument(skip(config), fields(repository = %config.target.repository, reference = %config.target.reference))]
pub async fn download_artifacts(config: &FetchConfig) -> Result<DownloadResult, FetchError> {
    let output_dir = prepare_output_dir(&config.output_path, config.overwrite).await?;

    let client = HttpClient::with_timeouts(config.timeouts).map_err(FetchError::HttpClient)?;
    let api = ApiClient::new(client.clone(), &config.api_url, config.api_key.clone())?;

    let manifest = api.prepare_batch_download(&config.target).await?;

    if manifest.files.is_empty() {
        warn!(path = %config.target.source_path, "No files found");
        return Ok(DownloadResult {
            commit_sha: manifest.commit_sha,
            file_count: 0,
            total_size: 0,
            files: Vec::new(),
        });
    }

    info!(
        files = manifest.files.len(),
        commit_sha = %manifest.commit_sha,
        "Found files to download"
    );

    let executor = BatchExecutor::new(config.concurrency, config.retry_policy.clone())?;

    let transfer: Box<dyn Transfer> = if manifest.presigned_urls_supported {
        Box::new(PresignedTransfer::new(client))
    } else {
        Box::new(ProxiedTransfer::new(
            client,
            api.base_url().clone(),
            api.api_key(),
            config.target.repository.clone(),
            config.target.reference.clone(),
        ))
    };
    info!(strategy = transfer.name(), "Downloading files");

    let batch = executor
        .run(&manifest.files, &output_dir, transfer.as_ref())
        .await;

    if !batch.failed.is_empty() {
        warn!(
            failed = batch.failed.len(),
            total = batch.total(),
            "Some files failed to download:\n{}",
            describe_failures(&batch.failed)
        );
    }

    if batch.failed.len() > batch.success.len() {
        return Err(FetchError::TooManyFailures {
            failed: batch.failed.len(),
            total: manifest.files.len(),
        });
    }

    Ok(DownloadResult {
        commit_sha: manifest.commit_sha.clone(),
        file_count: batch.success.len(),
        total_size: manifest.total_size(),
        files: batch.success,
    })
}

fn describe_failures(failed: &[FailedTransfer]) -> String {
    let mut lines: Vec<String> = failed
        .iter()
        .take(MAX_REPORTED_FAILURES)
        .map(|failure| format!("  - {}: {}", failure.path, failure.error))
        .collect();
    if failed.len() > MAX_REPORTED_FAILURES {
        lines.push(format!(
            "  ... and {} more",
            failed.len() - MAX_REPORTED_FAILURES
        ));
    }
    lines.join("\n")
}
