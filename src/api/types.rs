//! Wire types for the batch-download manifest endpoint.

use serde::{Deserialize, Serialize};

use crate::deployment::{DeploymentRef, DeploymentTarget};

/// Request body for `POST /api/deployments/prepare-batch-download`.
///
/// The resolver is flattened, so exactly one of `alias`, `commitSha`, or
/// `branch` appears in the JSON.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareBatchDownloadRequest<'a> {
    /// Repository in `owner/name` form.
    pub repository: &'a str,
    /// Directory within the deployment.
    pub path: &'a str,
    /// The single resolver.
    #[serde(flatten)]
    pub reference: &'a DeploymentRef,
}

impl<'a> From<&'a DeploymentTarget> for PrepareBatchDownloadRequest<'a> {
    fn from(target: &'a DeploymentTarget) -> Self {
        Self {
            repository: &target.repository,
            path: &target.source_path,
            reference: &target.reference,
        }
    }
}

/// One file listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileManifestEntry {
    /// Path relative to the requested source path, `/`-separated.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Presigned URL; only present when presigned transfers are supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// The server's description of a deployment's files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Whether files can be fetched directly via presigned URLs.
    pub presigned_urls_supported: bool,
    /// Resolved commit SHA, populated even when there are no files.
    pub commit_sha: String,
    /// Whether the deployment is public. Informational only.
    #[serde(default)]
    pub is_public: bool,
    /// Files to download. Order carries no meaning.
    pub files: Vec<FileManifestEntry>,
}

impl Manifest {
    /// Sum of all entry sizes in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }
}
