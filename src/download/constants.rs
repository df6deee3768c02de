//! Constants for the download module (timeouts, redirects, API routes).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (60 seconds without receiving data).
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Maximum redirect hops followed for a presigned download.
pub const MAX_REDIRECTS: usize = 5;

/// Route for proxied file downloads, joined with the API base URL.
pub const PROXIED_FILES_ROUTE: &str = "/api/files/";

/// Header carrying the API key on API requests.
pub const API_KEY_HEADER: &str = "X-API-Key";
