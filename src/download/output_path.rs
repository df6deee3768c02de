//! Mapping manifest paths onto the local output directory.

use std::path::{Component, Path, PathBuf};

use super::TransferError;

/// Joins a manifest path (always `/`-separated) onto `output_dir`.
///
/// Rejects absolute paths, parent-directory components, and paths with no
/// file name, so no entry can be written outside `output_dir`.
///
/// # Errors
///
/// Returns [`TransferError::UnsafePath`] for paths that would escape the
/// output directory or name no file.
pub fn resolve_output_path(output_dir: &Path, manifest_path: &str) -> Result<PathBuf, TransferError> {
    let mut resolved = output_dir.to_path_buf();
    let mut pushed = false;

    for segment in manifest_path.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => {
                resolved.push(part);
                pushed = true;
            }
            _ => return Err(TransferError::unsafe_path(manifest_path)),
        }
    }

    if manifest_path.starts_with('/') || !pushed {
        return Err(TransferError::unsafe_path(manifest_path));
    }

    Ok(resolved)
}
