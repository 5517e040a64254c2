use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("failed to read '{path}' for hashing: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("unknown digest algorithm '{0}'")]
    UnknownAlgorithm(String),
}

pub type Result<T> = std::result::Result<T, VerificationError>;
