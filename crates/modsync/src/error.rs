use modsync_fetch::{FetchError, FileFailure};
use modsync_install::InstallError;
use thiserror::Error;

use crate::ConfigError;

/// Terminal outcome of a failed [`Downloader`](crate::Downloader) operation.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The last fetch batch recorded per-file failures.
    #[error("{} file(s) failed to download", .failures.len())]
    FetchFailed { failures: Vec<FileFailure> },

    /// Every fetch succeeded but the module never verified complete.
    #[error("module still incomplete after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    #[error("download aborted")]
    Aborted,

    #[error(transparent)]
    Install(InstallError),

    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DownloadError {
    pub fn is_aborted(&self) -> bool { matches!(self, Self::Aborted) }
}

impl From<InstallError> for DownloadError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::Aborted => Self::Aborted,
            err => Self::Install(err),
        }
    }
}

impl From<FetchError> for DownloadError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Aborted => Self::Aborted,
            err => Self::Fetch(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
