use std::path::{Path, PathBuf};

use modsync_fetch::ContentCache;
use modsync_verify::Algorithm;
use tracing::{debug, info, instrument};

use crate::Result;

/// Imports pre-shipped module files into the content cache.
///
/// Blobs are keyed by the sha256 of their own bytes, not by any declared
/// checksum. Only `<bundle root>/<module>/<file>` is visited.
#[derive(Debug, Clone)]
pub struct BundleSeeder {
    bundle_root: PathBuf,
    cache:       ContentCache,
}

impl BundleSeeder {
    pub fn new(bundle_root: impl Into<PathBuf>, cache: ContentCache) -> Self {
        Self {
            bundle_root: bundle_root.into(),
            cache,
        }
    }

    pub fn bundle_root(&self) -> &Path { &self.bundle_root }

    /// Copy every bundled file into the cache and return how many were
    /// imported. Safe to repeat: re-seeding rewrites identical blobs.
    #[instrument(skip_all, fields(bundle = %self.bundle_root.display()))]
    pub async fn seed(&self) -> Result<usize> {
        let mut imported = 0;
        for module in list_dir(&self.bundle_root).await? {
            if !modsync_fs::is_dir(&module).await {
                debug!(path = %module.display(), "skipping non-module entry");
                continue;
            }
            for file in list_dir(&module).await? {
                let Some(digest) = self.cache.digest(&file, Algorithm::Sha256).await? else {
                    continue;
                };
                self.cache.store_path(&digest, &file).await?;
                debug!(path = %file.display(), sha = %digest, "seeded blob");
                imported += 1;
            }
        }
        info!(imported, "bundle seeded");
        Ok(imported)
    }
}

async fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source| modsync_fs::Error::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}
