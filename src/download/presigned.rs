//! Direct downloads from presigned storage URLs.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use tracing::{debug, instrument};
use url::Url;

use super::client::{ensure_parent_dir, save_response, send};
use super::constants::MAX_REDIRECTS;
use super::{HttpClient, Transfer, TransferError};
use crate::api::FileManifestEntry;

/// Downloads files straight from the presigned URL in each manifest entry.
///
/// No authentication is added; the URL itself grants access. Redirects are
/// followed manually, up to a fixed number of hops.
#[derive(Debug, Clone)]
pub struct PresignedTransfer {
    client: HttpClient,
    max_redirects: usize,
}

impl PresignedTransfer {
    /// Creates a presigned strategy following at most 5 redirects.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            max_redirects: MAX_REDIRECTS,
        }
    }

    /// Overrides the redirect hop limit.
    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Downloads `download_url` into `output_path`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] if the URL is invalid, the request fails, the
    /// final response is not 2xx, the redirect limit is exceeded, or writing
    /// to disk fails. No partial file is left behind on error.
    #[instrument(skip(self, download_url, output_path), fields(output = %output_path.display()))]
    pub async fn download(
        &self,
        download_url: &str,
        output_path: &Path,
    ) -> Result<u64, TransferError> {
        let mut current =
            Url::parse(download_url).map_err(|_| TransferError::invalid_url(redact(download_url)))?;

        ensure_parent_dir(output_path).await?;

        let mut hops = 0;
        loop {
            let shown = redact_url(&current);
            let response = send(self.client.inner().get(current.clone()), &shown).await?;
            let status = response.status();

            if is_followable_redirect(status.as_u16())
                && let Some(next) = redirect_target(&response, &current)
            {
                if hops >= self.max_redirects {
                    return Err(TransferError::too_many_redirects(
                        redact(download_url),
                        self.max_redirects,
                    ));
                }
                hops += 1;
                debug!(hop = hops, to = %redact_url(&next), "following redirect");
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(TransferError::http_status(shown, status.as_u16()));
            }

            return save_response(response, &shown, output_path).await;
        }
    }
}

#[async_trait]
impl Transfer for PresignedTransfer {
    fn name(&self) -> &'static str {
        "presigned"
    }

    async fn fetch(
        &self,
        entry: &FileManifestEntry,
        output_path: &Path,
    ) -> Result<u64, TransferError> {
        let Some(download_url) = entry.download_url.as_deref() else {
            return Err(TransferError::missing_download_url(&entry.path));
        };
        self.download(download_url, output_path).await
    }
}

fn is_followable_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Resolves the `Location` header against the current URL.
fn redirect_target(response: &reqwest::Response, current: &Url) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

/// Presigned URLs carry credentials in the query string; keep them out of
/// errors and logs.
fn redact_url(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.set_fragment(None);
    shown.to_string()
}

fn redact(raw: &str) -> String {
    Url::parse(raw).map_or_else(
        |_| raw.split('?').next().unwrap_or_default().to_string(),
        |url| redact_url(&url),
    )
}
