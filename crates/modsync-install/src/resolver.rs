use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use modsync_resource::{MANIFEST_FILE, VersionManifest};
use modsync_version::SemVer;
use tracing::debug;

use crate::Result;
use crate::layout::{is_os_artifact, module_dir};

/// File opened when navigating into a module.
pub const ENTRY_POINT: &str = "index.html";

/// Which copy of a module is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Installed,
    Bundled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub location: Location,
    pub version:  SemVer,
}

/// Raw manifests of both copies of a module. `None` means no manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleInfo {
    pub installed: Option<VersionManifest>,
    pub bundled:   Option<VersionManifest>,
}

/// Decides between the bundled and the installed copy of each module.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    installed_root: PathBuf,
    bundled_root:   PathBuf,
}

impl VersionResolver {
    pub fn new(installed_root: impl Into<PathBuf>, bundled_root: impl Into<PathBuf>) -> Self {
        Self {
            installed_root: installed_root.into(),
            bundled_root:   bundled_root.into(),
        }
    }

    pub fn root(&self, location: Location) -> &Path {
        match location {
            Location::Installed => &self.installed_root,
            Location::Bundled => &self.bundled_root,
        }
    }

    /// Read both manifests of `id` concurrently.
    pub async fn module_info(&self, id: &str) -> Result<ModuleInfo> {
        let (installed, bundled) = tokio::try_join!(
            read_manifest(&self.installed_root, id),
            read_manifest(&self.bundled_root, id),
        )?;
        Ok(ModuleInfo { installed, bundled })
    }

    /// The installed copy wins only when its version has strictly higher
    /// precedence than the bundled one; build metadata is ignored. Missing
    /// versions count as `0.0.0`.
    pub async fn resolve(&self, id: &str) -> Result<Resolution> {
        let info = self.module_info(id).await?;
        let installed = SemVer::parse_or_zero(info.installed.as_ref().and_then(|m| m.version.as_deref()))?;
        let bundled = SemVer::parse_or_zero(info.bundled.as_ref().and_then(|m| m.version.as_deref()))?;

        let resolution = if installed.cmp_precedence(&bundled) == Ordering::Greater {
            Resolution {
                location: Location::Installed,
                version:  installed,
            }
        } else {
            Resolution {
                location: Location::Bundled,
                version:  bundled,
            }
        };
        debug!(module = id, location = ?resolution.location, version = %resolution.version, "resolved module");
        Ok(resolution)
    }

    /// Resolve every module found under either root.
    pub async fn list_modules(&self) -> Result<BTreeMap<String, Resolution>> {
        let mut ids = module_names(&self.installed_root).await?;
        ids.extend(module_names(&self.bundled_root).await?);

        let mut modules = BTreeMap::new();
        for id in ids {
            let resolution = self.resolve(&id).await?;
            modules.insert(id, resolution);
        }
        Ok(modules)
    }

    /// `index.html` of the authoritative copy of `id`.
    pub async fn navigation_entry_point(&self, id: &str) -> Result<PathBuf> {
        let resolution = self.resolve(id).await?;
        Ok(module_dir(self.root(resolution.location), id)?.join(ENTRY_POINT))
    }
}

async fn read_manifest(root: &Path, id: &str) -> Result<Option<VersionManifest>> {
    let path = module_dir(root, id)?.join(MANIFEST_FILE);
    match modsync_fs::atomic_read(&path).await? {
        Some(bytes) => Ok(VersionManifest::from_slice(&bytes)?),
        None => Ok(None),
    }
}

async fn module_names(root: &Path) -> Result<BTreeSet<String>> {
    let read_err = |source| modsync_fs::Error::Read {
        path: root.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(read_err(e).into()),
    };

    let mut names = BTreeSet::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_os_artifact(&name) || !modsync_fs::is_dir(entry.path()).await {
            continue;
        }
        names.insert(name);
    }
    Ok(names)
}
