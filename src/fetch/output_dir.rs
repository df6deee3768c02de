//! Output directory preparation.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use super::FetchError;

/// Makes `path` an existing, empty-or-new directory.
///
/// A non-empty directory is an error unless `overwrite` is set, in which case
/// it is removed recursively first. Returns the absolute path.
pub(crate) async fn prepare_output_dir(path: &Path, overwrite: bool) -> Result<PathBuf, FetchError> {
    let path = std::path::absolute(path).map_err(|e| FetchError::output_dir(path, e))?;

    if !is_empty_or_missing(&path).await? {
        if !overwrite {
            return Err(FetchError::OutputDirNotEmpty { path });
        }
        info!(path = %path.display(), "removing existing output directory");
        fs::remove_dir_all(&path)
            .await
            .map_err(|e| FetchError::output_dir(&path, e))?;
    }

    fs::create_dir_all(&path)
        .await
        .map_err(|e| FetchError::output_dir(&path, e))?;
    debug!(path = %path.display(), "output directory ready");

    Ok(path)
}

async fn is_empty_or_missing(path: &Path) -> Result<bool, FetchError> {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(FetchError::output_dir(path, e)),
    };
    let first = entries
        .next_entry()
        .await
        .map_err(|e| FetchError::output_dir(path, e))?;
    Ok(first.is_none())
}
