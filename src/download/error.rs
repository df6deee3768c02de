//! Error types for file transfers.
//!
//! Every variant carries the URL or path it concerns, so a failed transfer can
//! be reported without parsing message text.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while transferring one file.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create dir, create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The URL is malformed or cannot carry a path.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A presigned download kept redirecting.
    #[error("too many redirects downloading {url} (limit {limit})")]
    TooManyRedirects {
        /// The URL the redirect chain started from.
        url: String,
        /// The configured hop limit.
        limit: usize,
    },

    /// The manifest entry has no presigned URL although presigned mode was selected.
    #[error("no download URL provided for {path}")]
    MissingDownloadUrl {
        /// Manifest path of the entry.
        path: String,
    },

    /// The manifest path would resolve outside the output directory.
    #[error("refusing to write {path}: path escapes the output directory")]
    UnsafePath {
        /// Manifest path of the entry.
        path: String,
    },
}

impl TransferError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a redirect limit error.
    pub fn too_many_redirects(url: impl Into<String>, limit: usize) -> Self {
        Self::TooManyRedirects {
            url: url.into(),
            limit,
        }
    }

    /// Creates a missing presigned URL error.
    pub fn missing_download_url(path: impl Into<String>) -> Self {
        Self::MissingDownloadUrl { path: path.into() }
    }

    /// Creates an unsafe path error.
    pub fn unsafe_path(path: impl Into<String>) -> Self {
        Self::UnsafePath { path: path.into() }
    }

    /// Whether another attempt could succeed.
    ///
    /// Malformed inputs fail the same way every time; everything that touches
    /// the network or disk is retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidUrl { .. } | Self::MissingDownloadUrl { .. } | Self::UnsafePath { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_timeout_display() {
        let error = TransferError::timeout("https://storage.example.com/app.js");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://storage.example.com/app.js"));
    }

    #[test]
    fn test_transfer_error_http_status_display() {
        let error = TransferError::http_status("https://storage.example.com/app.js", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://storage.example.com/app.js"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_transfer_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = TransferError::io(PathBuf::from("/tmp/out/index.html"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/out/index.html"), "Expected path in: {msg}");
    }

    #[test]
    fn test_transfer_error_redirect_limit_display() {
        let error = TransferError::too_many_redirects("https://storage.example.com/loop", 5);
        let msg = error.to_string();
        assert!(msg.contains("too many redirects"), "Unexpected message: {msg}");
        assert!(msg.contains("limit 5"), "Expected limit in: {msg}");
    }

    #[test]
    fn test_transfer_error_retryable_classification() {
        assert!(TransferError::http_status("https://x", 500).is_retryable());
        assert!(TransferError::http_status("https://x", 404).is_retryable());
        assert!(TransferError::timeout("https://x").is_retryable());
        assert!(!TransferError::invalid_url("nope").is_retryable());
        assert!(!TransferError::missing_download_url("a.txt").is_retryable());
        assert!(!TransferError::unsafe_path("../a.txt").is_retryable());
    }
}
