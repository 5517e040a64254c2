//! Fetching module files into a content-addressed cache.
//!
//! # Architecture
//!
//! This crate follows the data/effects split:
//! - [`data`] - progress, events and batch reports
//! - [`effects`] - the HTTP seam, the cache, the fetch queue and bulk checks
//!
//! # Key Features
//!
//! - **Content addressing**: blobs live at `<cache root>/<sha>` and are checked
//!   against the descriptor's md5 before they are trusted
//! - **Atomic placement**: downloads stream into a staging file that is renamed
//!   into place only once complete
//! - **Fail-soft batches**: a per-file failure is recorded and the rest of the
//!   batch carries on
//! - **Cooperative abort**: queued files are skipped and in-flight transfers are
//!   cancelled through their registry handles

pub mod data;
pub mod effects;
mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use data::{BatchReport, CheckReport, DownloadEvent, EventSink, FileFailure, Progress, ProgressTracker};
pub use effects::{
    BoxStream, CHECK_CONCURRENCY, CacheCheck, CacheState, ContentCache, DEFAULT_CONCURRENCY,
    FetchQueue, HttpClient, InFlight, Transfer, TransferId,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result};
