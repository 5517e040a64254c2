//! Error types for modsync-fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid cache key '{0}'")]
    InvalidKey(String),

    #[error("network error fetching '{url}': {message}")]
    Network { url: String, message: String },

    #[error("invalid proxy host '{host}': {message}")]
    Proxy { host: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Fs(#[from] modsync_fs::Error),

    #[error(transparent)]
    Verify(#[from] modsync_verify::VerificationError),

    #[error("download aborted")]
    Aborted,
}

impl FetchError {
    pub fn network(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Network {
            url:     url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_aborted(&self) -> bool { matches!(self, Self::Aborted) }
}

pub type Result<T> = std::result::Result<T, FetchError>;
