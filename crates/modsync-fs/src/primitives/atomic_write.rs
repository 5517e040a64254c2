use std::io::ErrorKind;
use std::path::Path;

use crate::primitives::staged::StagedFile;
use crate::{Error, Result};

/// Write `content` to `path` through a staging file.
pub async fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let mut staged = StagedFile::create(path).await?;
    staged.write_all(content).await?;
    staged.commit().await?;
    Ok(())
}

/// Read `path`, mapping a missing file to `None`.
pub async fn atomic_read(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
    let path = path.as_ref();
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Read {
            path:   path.to_path_buf(),
            source: e,
        }),
    }
}

/// Stream `src` into `dest`, creating the parents of `dest`. The copy becomes
/// visible at `dest` only once complete.
pub async fn copy_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
    let src = src.as_ref();
    let mut reader = tokio::fs::File::open(src).await.map_err(|e| Error::Read {
        path:   src.to_path_buf(),
        source: e,
    })?;

    let mut staged = StagedFile::create(dest).await?;
    staged.copy_from(&mut reader).await?;
    staged.commit().await
}
