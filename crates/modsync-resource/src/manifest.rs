use serde::{Deserialize, Serialize};

use crate::{ResourceError, Result};

/// File name of the per-module version manifest.
pub const MANIFEST_FILE: &str = "version.json";

/// Contents of `<module root>/version.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl VersionManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
        }
    }

    /// Decode manifest bytes. Empty (or whitespace-only) content is treated as
    /// no manifest at all.
    pub fn from_slice(bytes: &[u8]) -> Result<Option<Self>> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(ResourceError::Manifest)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> { serde_json::to_vec(self).map_err(ResourceError::Manifest) }
}
