//! Writing rendered file blocks to disk

use crate::error::EngineError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Destination of a file block: `name` under `root`
///
/// Leading slashes are dropped so an absolute-looking block name still lands
/// under the destination.
pub fn output_path(root: &Path, name: &str) -> PathBuf {
    root.join(name.trim_start_matches('/'))
}

/// Whether something is already at `path`; unreadable metadata counts as absent
pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Create missing parent directories, then create or truncate `path` with `content`
pub async fn write_file(path: &Path, content: &str) -> Result<(), EngineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| EngineError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    fs::write(path, content)
        .await
        .map_err(|source| EngineError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
}
