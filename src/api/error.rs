//! Error types for manifest requests.
//!
//! Manifest failures are fatal for the run; nothing here is retried.

use thiserror::Error;

/// Maximum characters of an error response body kept in [`ApiError::HttpStatus`].
pub(crate) const ERROR_BODY_LIMIT: usize = 500;

/// Maximum characters of an unparsable body kept in [`ApiError::Parse`].
pub(crate) const PARSE_BODY_LIMIT: usize = 200;

/// Errors that can occur while requesting a download manifest.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured API URL cannot be used as a base for API routes.
    #[error("invalid API URL '{url}'\n  Suggestion: Use an absolute http(s) URL such as https://assets.example.com")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },

    /// Network-level error reaching the API.
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The API did not answer in time.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// The API answered with a non-success status.
    #[error("API request failed: HTTP {status} - {body}")]
    HttpStatus {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The response body is not a valid manifest.
    #[error("failed to parse response: {body}")]
    Parse {
        /// Leading part of the response body.
        body: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
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

    /// Creates an HTTP status error, truncating the body.
    pub fn http_status(url: impl Into<String>, status: u16, body: &str) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: truncate_chars(body, ERROR_BODY_LIMIT),
        }
    }

    /// Creates a parse error, truncating the body.
    pub fn parse(body: &str, source: serde_json::Error) -> Self {
        Self::Parse {
            body: truncate_chars(body, PARSE_BODY_LIMIT),
            source,
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
