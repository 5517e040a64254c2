//! Descriptor types consumed by the modsync pipeline.
//!
//! A [`Module`] is an immutable, caller-owned description of a versioned set
//! of files. Each [`FileEntry`] is content-addressed by its `sha` and checked
//! against its `md5` once cached.

mod error;
mod file;
mod manifest;
mod module;

pub use error::{ResourceError, Result};
pub use file::FileEntry;
pub use manifest::{MANIFEST_FILE, VersionManifest};
pub use module::Module;
