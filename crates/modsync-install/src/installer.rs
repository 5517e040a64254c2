use std::path::{Path, PathBuf};

use modsync_fetch::ContentCache;
use modsync_resource::{FileEntry, MANIFEST_FILE, Module, VersionManifest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::layout::module_dir;
use crate::{InstallError, Result};

/// Copies cached module files into the install root.
#[derive(Debug, Clone)]
pub struct Installer {
    root:  PathBuf,
    cache: ContentCache,
}

impl Installer {
    pub fn new(root: impl Into<PathBuf>, cache: ContentCache) -> Self {
        Self {
            root: root.into(),
            cache,
        }
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn module_dir(&self, id: &str) -> Result<PathBuf> { module_dir(&self.root, id) }

    /// `<root>/<id>/<localPath>/<localName>`.
    pub fn destination(&self, module_id: &str, file: &FileEntry) -> Result<PathBuf> {
        let unsafe_path = || InstallError::UnsafePath {
            module: module_id.to_string(),
            path:   format!("{}/{}", file.local_path, file.local_name),
        };

        let dir = modsync_fs::relative_path(&file.local_path).map_err(|_| unsafe_path())?;
        let name = modsync_fs::relative_path(&file.local_name).map_err(|_| unsafe_path())?;
        if name.as_os_str().is_empty() {
            return Err(unsafe_path());
        }

        Ok(self.module_dir(module_id)?.join(dir).join(name))
    }

    /// Copy every file of `module` out of the cache, in descriptor order.
    ///
    /// The first failure stops the install; files already copied stay in
    /// place. `cancel` is checked before each file. Returns the number of
    /// bytes written.
    #[instrument(skip_all, fields(module = %module.id, files = module.files.len()))]
    pub async fn install(&self, module: &Module, cancel: &CancellationToken) -> Result<u64> {
        let mut written = 0;
        for file in &module.files {
            if cancel.is_cancelled() {
                info!(bytes = written, "install aborted");
                return Err(InstallError::Aborted);
            }
            let destination = self.destination(&module.id, file)?;
            let bytes = self.cache.copy_out(file, &destination).await?;
            debug!(sha = %file.sha, destination = %destination.display(), bytes, "installed file");
            written += bytes;
        }
        info!(bytes = written, "module installed");
        Ok(written)
    }

    /// Write `{"version": ...}` to `<root>/<id>/version.json`, replacing any
    /// existing manifest.
    pub async fn write_manifest(&self, module: &Module) -> Result<PathBuf> {
        let path = self.module_dir(&module.id)?.join(MANIFEST_FILE);
        let bytes = VersionManifest::new(&module.version).to_vec()?;
        modsync_fs::atomic_write(&path, &bytes).await?;
        debug!(module = %module.id, version = %module.version, "wrote manifest");
        Ok(path)
    }

    /// Remove the installed copy of a module. A module that is not installed
    /// is not an error.
    pub async fn uninstall(&self, id: &str) -> Result<()> {
        let dir = self.module_dir(id)?;
        modsync_fs::remove_dir_all(&dir).await?;
        info!(module = id, "module uninstalled");
        Ok(())
    }
}
