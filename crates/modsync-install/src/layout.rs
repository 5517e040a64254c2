use std::path::{Path, PathBuf};

use modsync_fs::relative_path;

use crate::{InstallError, Result};

/// `<root>/<id>`. The id must be exactly one path segment.
pub(crate) fn module_dir(root: &Path, id: &str) -> Result<PathBuf> {
    match relative_path(id) {
        Ok(rel) if rel.components().count() == 1 => Ok(root.join(rel)),
        _ => Err(InstallError::InvalidModuleId(id.to_string())),
    }
}

/// Names that operating systems drop into directories on their own.
pub(crate) fn is_os_artifact(name: &str) -> bool {
    name.starts_with('.') || name.eq_ignore_ascii_case("Thumbs.db") || name.eq_ignore_ascii_case("desktop.ini")
}
