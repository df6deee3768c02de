//! Artifact Downloader Core Library
//!
//! This library fetches the file manifest of a named deployment (selected by
//! alias, commit SHA, or branch) and materializes the files into a local
//! directory tree.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`deployment`] - Deployment target and reference types
//! - [`api`] - Manifest client for the deployment API
//! - [`download`] - Transfer strategies, retry policy, and the batch executor
//! - [`fetch`] - Orchestration: output directory, strategy selection, failure threshold

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod deployment;
pub mod download;
pub mod fetch;
mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, FileManifestEntry, Manifest};
pub use deployment::{DeploymentRef, DeploymentTarget};
pub use download::{
    BatchExecutor, BatchResult, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, ExecutorError,
    FailedTransfer, HttpClient, HttpTimeouts, PresignedTransfer, ProxiedTransfer, RetryPolicy,
    Transfer, TransferError, TransferOutcome,
};
pub use fetch::{DownloadResult, FetchConfig, FetchError, download_artifacts};
