//! File transfer strategies and the batch executor that drives them.
//!
//! # Features
//!
//! - Two interchangeable [`Transfer`] strategies: [`PresignedTransfer`]
//!   (direct from storage, bounded redirect following) and
//!   [`ProxiedTransfer`] (through the API with an API-key header)
//! - Streaming downloads (memory-efficient for large files)
//! - No partial files left behind on failure
//! - Windowed concurrency with per-file retry and exponential backoff
//! - Structured per-file failures carrying the manifest path
//!
//! # Example
//!
//! ```no_run
//! use artifact_downloader_core::download::HttpClient;
//! use artifact_downloader_core::download::PresignedTransfer;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transfer = PresignedTransfer::new(HttpClient::new()?);
//! let bytes = transfer
//!     .download("https://storage.example.com/site/index.html?sig=abc", Path::new("./dist/index.html"))
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod batch;
mod client;
pub(crate) mod constants;
mod error;
mod output_path;
mod presigned;
mod proxied;
mod retry;
mod transfer;

pub use batch::{
    BatchExecutor, BatchResult, DEFAULT_CONCURRENCY, ExecutorError, FailedTransfer, TransferOutcome,
};
pub use client::{HttpClient, HttpTimeouts};
pub use error::TransferError;
pub use output_path::resolve_output_path;
pub use presigned::PresignedTransfer;
pub use proxied::ProxiedTransfer;
pub use retry::{DEFAULT_MAX_RETRIES, RetryDecision, RetryPolicy};
pub use transfer::Transfer;
