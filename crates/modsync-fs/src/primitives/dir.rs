use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Create every missing parent directory of `path` and return the parent.
pub async fn ensure_parent(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| Error::Write {
        path:   path.to_path_buf(),
        source: std::io::Error::other("no parent directory"),
    })?;

    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| Error::CreateDir {
            path:   parent.to_path_buf(),
            source: e,
        })?;

    Ok(parent.to_path_buf())
}

/// Recursively delete `path`. A path that does not exist is not an error.
pub async fn remove_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Remove {
            path:   path.to_path_buf(),
            source: e,
        }),
    }
}

/// `true` when `path` exists and is a directory (symlinks followed).
pub async fn is_dir(path: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(path.as_ref())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
