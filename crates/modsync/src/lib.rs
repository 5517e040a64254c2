//! # modsync
//!
//! Fetches versioned, multi-file modules into a local content-addressed cache,
//! checks every blob against its declared digest and installs the module into
//! a device-local directory. A module may also ship pre-installed in a
//! read-only bundle; the installed copy replaces it only with a strictly
//! greater version.
//!
//! The whole pipeline hangs off one explicitly constructed [`Downloader`]:
//!
//! ```no_run
//! # async fn demo() -> Result<(), modsync::DownloadError> {
//! use modsync::{CancellationToken, Downloader, DownloaderConfig, Module};
//!
//! let config = DownloaderConfig::default().concurrency(8);
//! let downloader = Downloader::new(config)?;
//!
//! let module = Module::from_json(r#"{"_id":"m1","version":"1.0.0","files":[]}"#)
//!     .expect("valid descriptor");
//! let cancel = CancellationToken::new();
//! downloader
//!     .download_module(&module, &cancel, |p| println!("{}/{}", p.bytes_transferred, p.total_bytes))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - `modsync-fs`: staged writes and path sanitization
//! - `modsync-verify`: md5/sha256 digests
//! - `modsync-version`: lenient semantic versions
//! - `modsync-resource`: module and file descriptors
//! - `modsync-fetch`: HTTP seam, content cache, fetch queue
//! - `modsync-install`: installer, bundle seeder, version resolver

mod config;
mod downloader;
mod error;
mod retry;

pub use config::{ConfigError, DownloaderConfig};
pub use downloader::Downloader;
pub use error::{DownloadError, Result};
pub use retry::retry_delay;

pub use modsync_fetch::{
    BatchReport, CacheState, CheckReport, ContentCache, DownloadEvent, EventSink, FetchError, FileFailure,
    HttpClient, Progress,
};
#[cfg(feature = "reqwest")]
pub use modsync_fetch::ReqwestClient;
pub use modsync_install::{InstallError, Location, ModuleInfo, Resolution};
pub use modsync_resource::{FileEntry, Module, VersionManifest};
pub use modsync_verify::Algorithm;
pub use modsync_version::SemVer;
pub use tokio_util::sync::CancellationToken;
