use serde::{Deserialize, Deserializer, Serialize};

/// One file of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Content address: the cache key for this file's bytes.
    pub sha: String,
    /// Integrity digest of the cached bytes.
    pub md5: String,
    pub url: String,
    /// Declared size in bytes, used for progress accounting only.
    #[serde(deserialize_with = "size_from_number_or_string")]
    pub size: u64,
    /// Directory relative to the module root.
    #[serde(default)]
    pub local_path: String,
    pub local_name: String,
}

impl FileEntry {
    pub fn new(
        sha: impl Into<String>,
        md5: impl Into<String>,
        url: impl Into<String>,
        size: u64,
        local_path: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            sha: sha.into(),
            md5: md5.into(),
            url: url.into(),
            size,
            local_path: local_path.into(),
            local_name: local_name.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn size_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
