use serde::{Deserialize, Serialize};

use crate::{FileEntry, ResourceError, Result};

/// A versioned set of files installed together under one id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    #[serde(alias = "_id")]
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl Module {
    pub fn new(id: impl Into<String>, version: impl Into<String>, files: Vec<FileEntry>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            files,
        }
    }

    /// Decode a module descriptor, ignoring unknown fields.
    pub fn from_json(raw: &str) -> Result<Self> { serde_json::from_str(raw).map_err(ResourceError::Descriptor) }

    /// Sum of the declared sizes of all files.
    pub fn total_size(&self) -> u64 { self.files.iter().map(|f| f.size).sum() }
}
