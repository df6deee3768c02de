//! Manifest client for the deployment API.
//!
//! A single `POST /api/deployments/prepare-batch-download` resolves the
//! deployment to a commit SHA and lists its files, telling the caller whether
//! presigned URLs are available.
//!
//! # Example
//!
//! ```no_run
//! use artifact_downloader_core::api::ApiClient;
//! use artifact_downloader_core::deployment::{DeploymentRef, DeploymentTarget};
//! use artifact_downloader_core::download::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = ApiClient::new(HttpClient::new()?, "https://assets.example.com", "api-key")?;
//! let target = DeploymentTarget::new("acme/site", "dist", DeploymentRef::Alias("production".into()));
//! let manifest = api.prepare_batch_download(&target).await?;
//! println!("{} files at {}", manifest.files.len(), manifest.commit_sha);
//! # Ok(())
//! # }
//! ```

mod error;
mod types;

pub use error::ApiError;
pub use types::{FileManifestEntry, Manifest, PrepareBatchDownloadRequest};

use std::fmt;

use tracing::{debug, info, instrument};
use url::Url;

use crate::deployment::DeploymentTarget;
use crate::download::HttpClient;
use crate::download::constants::API_KEY_HEADER;

/// Route of the manifest endpoint, joined with the API base URL.
const PREPARE_BATCH_DOWNLOAD_ROUTE: &str = "/api/deployments/prepare-batch-download";

/// Client for the deployment API.
#[derive(Clone)]
pub struct ApiClient {
    client: HttpClient,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for the API at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `api_url` is not an absolute
    /// http(s) URL.
    pub fn new(
        client: HttpClient,
        api_url: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(api_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl {
                url: api_url.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// The parsed API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The API key sent with every request.
    #[must_use]
    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Requests the file manifest for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, non-2xx status, or a body
    /// that is not a valid manifest. No retry happens at this layer.
    #[instrument(skip(self, target), fields(repository = %target.repository, reference = %target.reference))]
    pub async fn prepare_batch_download(
        &self,
        target: &DeploymentTarget,
    ) -> Result<Manifest, ApiError> {
        let url = self
            .base_url
            .join(PREPARE_BATCH_DOWNLOAD_ROUTE)
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })?;

        info!(path = %target.source_path, "requesting download manifest");

        let response = self
            .client
            .inner()
            .post(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&PrepareBatchDownloadRequest::from(target))
            .send()
            .await
            .map_err(|e| ApiError::network(url.as_str(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(url.as_str(), e))?;

        if !status.is_success() {
            return Err(ApiError::http_status(url.as_str(), status.as_u16(), &body));
        }

        let manifest: Manifest =
            serde_json::from_str(&body).map_err(|e| ApiError::parse(&body, e))?;

        debug!(
            files = manifest.files.len(),
            commit_sha = %manifest.commit_sha,
            presigned = manifest.presigned_urls_supported,
            is_public = manifest.is_public,
            "manifest received"
        );

        Ok(manifest)
    }
}
