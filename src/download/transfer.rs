//! The "fetch one file to one path" contract shared by both strategies.

use std::path::Path;

use async_trait::async_trait;

use super::TransferError;
use crate::api::FileManifestEntry;

/// A strategy for transferring a single manifest entry to a local path.
///
/// The strategy is chosen once per batch; the executor calls it for every
/// file and owns retries, so implementations make exactly one attempt.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Short strategy name for logs.
    fn name(&self) -> &'static str;

    /// Transfers `entry` to `output_path`, returning the bytes written.
    ///
    /// On failure no file is left at `output_path`.
    async fn fetch(
        &self,
        entry: &FileManifestEntry,
        output_path: &Path,
    ) -> Result<u64, TransferError>;
}
