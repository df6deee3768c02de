//! HTTP client wrapper and streaming-to-disk helpers.
//!
//! One [`HttpClient`] is built per run and shared by the manifest client and
//! both transfer strategies, taking advantage of connection pooling.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, redirect};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::TransferError;
use crate::user_agent;

/// Timeout settings applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Connection establishment limit in seconds.
    pub connect_secs: u64,
    /// Limit in seconds on waiting for the next chunk of a response.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// HTTP client shared by all requests of a run.
///
/// Automatic redirects are disabled: the presigned strategy follows them
/// itself with a bounded hop count, and API routes never redirect.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 60 seconds between chunks
    /// - Gzip decompression: enabled
    /// - Redirects: not followed automatically
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeouts(HttpTimeouts::default())
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_timeouts(timeouts: HttpTimeouts) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .read_timeout(Duration::from_secs(timeouts.read_secs))
            .redirect(redirect::Policy::none())
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Sends a request, mapping transport failures to [`TransferError`].
///
/// The status code is not inspected here.
pub(crate) async fn send(
    request: RequestBuilder,
    url: &str,
) -> Result<reqwest::Response, TransferError> {
    request
        .send()
        .await
        .map_err(|e| TransferError::network(url, e))
}

/// Creates the parent directory of `output_path` if needed.
///
/// Safe to call concurrently for sibling files sharing a directory.
pub(crate) async fn ensure_parent_dir(output_path: &Path) -> Result<(), TransferError> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TransferError::io(parent, e))?;
    }
    Ok(())
}

/// Writes a successful response body to `output_path`, returning bytes written.
///
/// The partially written file is removed if streaming fails.
pub(crate) async fn save_response(
    response: reqwest::Response,
    url: &str,
    output_path: &Path,
) -> Result<u64, TransferError> {
    let mut file = File::create(output_path)
        .await
        .map_err(|e| TransferError::io(output_path, e))?;

    let stream_result = stream_to_file(&mut file, response, url, output_path).await;

    if stream_result.is_err() {
        drop(file);
        debug!(path = %output_path.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(output_path).await;
    }

    stream_result
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, TransferError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| TransferError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| TransferError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| TransferError::io(file_path, e))?;

    Ok(bytes_written)
}
