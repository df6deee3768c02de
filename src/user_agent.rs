//! User-Agent string shared by manifest and file requests.

/// Product token sent with every request.
const PRODUCT: &str = "artifact-downloader";

/// Default User-Agent for all requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version}")
}
