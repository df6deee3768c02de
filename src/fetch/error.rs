//! Errors that abort a whole fetch run.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::download::ExecutorError;

/// Fatal errors from [`download_artifacts`](super::download_artifacts).
///
/// Per-file transfer failures never appear here directly; they are collected
/// by the batch executor and only escalate through [`FetchError::TooManyFailures`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The output directory has contents and overwriting was not requested.
    #[error(
        "output directory '{}' exists and is not empty\n  Suggestion: Enable overwrite to replace its contents",
        path.display()
    )]
    OutputDirNotEmpty {
        /// The output directory.
        path: PathBuf,
    },

    /// The output directory could not be inspected, removed, or created.
    #[error("failed to prepare output directory '{}': {source}", path.display())]
    OutputDir {
        /// The output directory.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The manifest request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The batch executor rejected its configuration.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// More files failed than succeeded.
    #[error("too many download failures: {failed}/{total}")]
    TooManyFailures {
        /// Files that failed after all retries.
        failed: usize,
        /// Files in the manifest.
        total: usize,
    },
}

impl FetchError {
    pub(crate) fn output_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputDir {
            path: path.into(),
            source,
        }
    }
}
