#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("invalid module descriptor: {0}")]
    Descriptor(#[source] serde_json::Error),

    #[error("invalid version manifest: {0}")]
    Manifest(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResourceError>;
