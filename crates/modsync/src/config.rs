use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] toml::de::Error),
}

/// Settings for a [`Downloader`](crate::Downloader).
///
/// Every field is optional in TOML; missing fields take their defaults.
///
/// ```toml
/// concurrency = 8
/// cache_root = "/var/cache/modsync"
/// install_root = "/srv/modules/installed"
/// bundle_root = "/srv/modules/bundled"
/// max_failures = 3
/// proxy = "proxy.local:3128"
/// retry_backoff_ms = 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Files fetched at once per batch.
    pub concurrency:      usize,
    pub cache_root:       PathBuf,
    pub install_root:     PathBuf,
    /// Read-only pre-shipped modules.
    pub bundle_root:      PathBuf,
    /// Fetch/check cycles attempted before a download fails.
    pub max_failures:     u32,
    /// `host[:port]`; requests keep their own scheme.
    pub proxy:            Option<String>,
    /// Base of the exponential wait between failed cycles. `0` retries
    /// immediately.
    pub retry_backoff_ms: u64,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            concurrency:      modsync_fetch::DEFAULT_CONCURRENCY,
            cache_root:       std::env::temp_dir().join("downloadCache"),
            install_root:     PathBuf::from("installed"),
            bundle_root:      PathBuf::from("bundled"),
            max_failures:     3,
            proxy:            None,
            retry_backoff_ms: 0,
        }
    }
}

impl DownloaderConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(raw)?) }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = root.into();
        self
    }

    pub fn install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = root.into();
        self
    }

    pub fn bundle_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.bundle_root = root.into();
        self
    }

    pub fn max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures;
        self
    }

    pub fn proxy(mut self, host: impl Into<String>) -> Self {
        self.proxy = Some(host.into());
        self
    }

    pub fn retry_backoff(mut self, base: Duration) -> Self {
        self.retry_backoff_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn backoff_base(&self) -> Duration { Duration::from_millis(self.retry_backoff_ms) }

    /// Same layout as `self`, with every root placed under `base`.
    pub fn rooted_at(self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            cache_root: base.join("downloadCache"),
            install_root: base.join("installed"),
            bundle_root: base.join("bundled"),
            ..self
        }
    }
}
