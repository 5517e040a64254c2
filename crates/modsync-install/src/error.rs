//! Error types for modsync-install.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("unsafe path '{path}' in module '{module}'")]
    UnsafePath { module: String, path: String },

    #[error("invalid module id '{0}'")]
    InvalidModuleId(String),

    #[error("install aborted")]
    Aborted,

    #[error(transparent)]
    Fs(#[from] modsync_fs::Error),

    #[error(transparent)]
    Cache(#[from] modsync_fetch::FetchError),

    #[error(transparent)]
    Resource(#[from] modsync_resource::ResourceError),

    #[error(transparent)]
    Version(#[from] modsync_version::VersionError),
}

pub type Result<T> = std::result::Result<T, InstallError>;
