use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::primitives::dir::ensure_parent;
use crate::{Error, Result};

/// A file written next to its destination and renamed into place on commit.
///
/// Dropping an uncommitted `StagedFile` removes the staging file, so an
/// interrupted write (error, cancellation, panic) never leaves partial content
/// at the destination path.
#[derive(Debug)]
pub struct StagedFile {
    file:         Option<File>,
    staging_path: PathBuf,
    destination:  PathBuf,
    written:      u64,
}

impl StagedFile {
    /// Create the staging file, creating any missing parent directories of
    /// `destination` first.
    pub async fn create(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();
        let parent = ensure_parent(&destination).await?;
        let staging_path = parent.join(format!(".tmp.{}.modsync", Uuid::new_v4()));

        let file = File::create(&staging_path).await.map_err(|e| Error::Write {
            path:   staging_path.clone(),
            source: e,
        })?;

        Ok(Self {
            file: Some(file),
            staging_path,
            destination,
            written: 0,
        })
    }

    pub fn staging_path(&self) -> &Path { &self.staging_path }

    pub fn destination(&self) -> &Path { &self.destination }

    /// Bytes written so far.
    pub fn written(&self) -> u64 { self.written }

    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(closed(&self.staging_path));
        };
        file.write_all(buf).await.map_err(|e| Error::Write {
            path:   self.staging_path.clone(),
            source: e,
        })?;
        self.written += buf.len() as u64;
        Ok(())
    }

    /// Copy everything from `reader` into the staging file.
    pub async fn copy_from<R>(&mut self, reader: &mut R) -> Result<u64>
    where
        R: tokio::io::AsyncRead + Unpin + ?Sized,
    {
        let Some(file) = self.file.as_mut() else {
            return Err(closed(&self.staging_path));
        };
        let n = tokio::io::copy(reader, file).await.map_err(|e| Error::Write {
            path:   self.staging_path.clone(),
            source: e,
        })?;
        self.written += n;
        Ok(n)
    }

    /// Flush, sync and rename the staging file over the destination.
    pub async fn commit(mut self) -> Result<u64> {
        let Some(mut file) = self.file.take() else {
            return Err(closed(&self.staging_path));
        };
        file.flush().await.map_err(|e| Error::Write {
            path:   self.staging_path.clone(),
            source: e,
        })?;
        file.sync_all().await.map_err(|e| Error::Write {
            path:   self.staging_path.clone(),
            source: e,
        })?;
        drop(file);

        tokio::fs::rename(&self.staging_path, &self.destination)
            .await
            .map_err(|e| Error::Write {
                path:   self.destination.clone(),
                source: e,
            })?;

        // Nothing left to clean up once the rename went through.
        self.staging_path = PathBuf::new();
        Ok(self.written)
    }
}

fn closed(path: &Path) -> Error {
    Error::Write {
        path:   path.to_path_buf(),
        source: std::io::Error::other("staging file already closed"),
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        drop(self.file.take());
        if !self.staging_path.as_os_str().is_empty() {
            let _ = std::fs::remove_file(&self.staging_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn commit_moves_content_into_place() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("nested").join("blob");

        let mut staged = StagedFile::create(&dest).await.unwrap();
        staged.write_all(b"hello ").await.unwrap();
        staged.write_all(b"world").await.unwrap();
        assert!(!dest.exists());

        let written = staged.commit().await.unwrap();
        assert_eq!(written, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn drop_without_commit_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("blob");

        let staging = {
            let mut staged = StagedFile::create(&dest).await.unwrap();
            staged.write_all(b"partial").await.unwrap();
            staged.staging_path().to_path_buf()
        };

        assert!(!staging.exists());
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn commit_replaces_existing_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("blob");
        std::fs::write(&dest, "old").unwrap();

        let mut staged = StagedFile::create(&dest).await.unwrap();
        staged.copy_from(&mut &b"new content"[..]).await.unwrap();
        staged.commit().await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new content");
    }
}
