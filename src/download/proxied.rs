//! Downloads proxied through the deployment API.
//!
//! Used when the storage backend cannot issue presigned URLs. Each file is
//! fetched from `GET /api/files/<path>` with the deployment identified by
//! query parameters and the API key sent as a header.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use super::client::{ensure_parent_dir, save_response, send};
use super::constants::{API_KEY_HEADER, PROXIED_FILES_ROUTE};
use super::{HttpClient, Transfer, TransferError};
use crate::api::FileManifestEntry;
use crate::deployment::DeploymentRef;

/// Fetches files through the API using the caller's API key.
#[derive(Clone)]
pub struct ProxiedTransfer {
    client: HttpClient,
    base_url: Url,
    api_key: String,
    repository: String,
    reference: DeploymentRef,
}

impl fmt::Debug for ProxiedTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxiedTransfer")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("repository", &self.repository)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl ProxiedTransfer {
    /// Creates a proxied strategy bound to one deployment.
    pub fn new(
        client: HttpClient,
        base_url: Url,
        api_key: impl Into<String>,
        repository: impl Into<String>,
        reference: DeploymentRef,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
            repository: repository.into(),
            reference,
        }
    }

    /// Builds the request URL for `file_path`.
    ///
    /// Path segments are percent-encoded individually; only the repository
    /// and the one configured resolver are attached as query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidUrl`] if the base URL cannot carry a path.
    pub fn file_url(&self, file_path: &str) -> Result<Url, TransferError> {
        let mut url = self
            .base_url
            .join(PROXIED_FILES_ROUTE)
            .map_err(|_| TransferError::invalid_url(self.base_url.as_str()))?;

        url.path_segments_mut()
            .map_err(|()| TransferError::invalid_url(self.base_url.as_str()))?
            .pop_if_empty()
            .extend(file_path.split('/').filter(|segment| !segment.is_empty()));

        url.query_pairs_mut()
            .append_pair("repository", &self.repository)
            .append_pair(self.reference.param_name(), self.reference.value());

        Ok(url)
    }

    /// Downloads `file_path` from the API into `output_path`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] if the request fails, the response is not
    /// 2xx, or writing to disk fails. No partial file is left behind on error.
    #[instrument(skip(self, output_path), fields(output = %output_path.display()))]
    pub async fn download(&self, file_path: &str, output_path: &Path) -> Result<u64, TransferError> {
        let url = self.file_url(file_path)?;

        ensure_parent_dir(output_path).await?;

        let request = self
            .client
            .inner()
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key);
        let response = send(request, url.as_str()).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::http_status(url.as_str(), status.as_u16()));
        }

        save_response(response, url.as_str(), output_path).await
    }
}

#[async_trait]
impl Transfer for ProxiedTransfer {
    fn name(&self) -> &'static str {
        "proxied"
    }

    async fn fetch(
        &self,
        entry: &FileManifestEntry,
        output_path: &Path,
    ) -> Result<u64, TransferError> {
        self.download(&entry.path, output_path).await
    }
}
