use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use modsync_fs::StagedFile;
use modsync_resource::FileEntry;
use modsync_verify::{Algorithm, digest_matches, hash_file};
use tracing::debug;

use crate::{FetchError, Result};

/// What the cache holds for a file descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No usable blob at the content address (missing, or a directory).
    Absent,
    /// A blob exists but its digest does not match the descriptor.
    Corrupt,
    /// A blob exists and matches the descriptor's digest.
    Valid,
}

impl CacheState {
    pub fn is_valid(self) -> bool { self == Self::Valid }
}

/// Durable, checksum-addressed blob store: one file per content address
/// directly under the cache root.
#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
}

impl ContentCache {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    /// Path of the blob stored under `key`.
    ///
    /// Keys are single path segments; anything that could address a location
    /// outside the cache root is rejected.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0', ':']);
        if !valid {
            return Err(FetchError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    /// Check whether the blob for `file` is present and matches `file.md5`.
    ///
    /// The digest algorithm is inferred from the format of `file.md5`.
    pub async fn has(&self, file: &FileEntry) -> Result<CacheState> {
        let path = self.path_for(&file.sha)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                debug!(path = %path.display(), "cache entry is a directory");
                return Ok(CacheState::Absent);
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CacheState::Absent),
            Err(e) => {
                return Err(modsync_fs::Error::Read {
                    path:   path.clone(),
                    source: e,
                }
                .into());
            }
        }

        let Some(actual) = hash_file(&path, Algorithm::infer(&file.md5)).await? else {
            return Ok(CacheState::Absent);
        };

        if digest_matches(&actual, &file.md5) {
            Ok(CacheState::Valid)
        } else {
            debug!(sha = %file.sha, expected = %file.md5, actual = %actual, "cache entry is corrupt");
            Ok(CacheState::Corrupt)
        }
    }

    /// Write `body` to the content address of `file`, replacing whatever was
    /// there. The blob only appears once the whole body has been written.
    pub async fn store<S, E>(&self, file: &FileEntry, mut body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let path = self.path_for(&file.sha)?;
        let mut staged = StagedFile::create(&path).await?;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| FetchError::network(&file.url, e))?;
            staged.write_all(&chunk).await?;
        }

        let written = staged.commit().await?;
        debug!(sha = %file.sha, bytes = written, "stored blob");
        Ok(written)
    }

    /// Copy the file at `src` into the cache under `key`.
    pub async fn store_path(&self, key: &str, src: impl AsRef<Path>) -> Result<u64> {
        let path = self.path_for(key)?;
        Ok(modsync_fs::copy_file(src, path).await?)
    }

    /// Stream the cached blob of `file` to `destination`, creating parents.
    pub async fn copy_out(&self, file: &FileEntry, destination: impl AsRef<Path>) -> Result<u64> {
        let path = self.path_for(&file.sha)?;
        Ok(modsync_fs::copy_file(path, destination).await?)
    }

    /// Hex digest of the file at `path`, `None` for a directory.
    pub async fn digest(&self, path: impl AsRef<Path>, algorithm: Algorithm) -> Result<Option<String>> {
        Ok(hash_file(path, algorithm).await?)
    }
}
