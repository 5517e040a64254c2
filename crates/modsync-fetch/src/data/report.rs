use modsync_resource::FileEntry;

use crate::FetchError;

/// A file that could not be fetched or checked, and why.
#[derive(Debug, thiserror::Error)]
#[error("{}: {}", .file.sha, .error)]
pub struct FileFailure {
    pub file:  FileEntry,
    #[source]
    pub error: FetchError,
}

/// Outcome of one fetch batch. Every submitted file ends up in exactly one of
/// the lists.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Already present and valid; no network access.
    pub cached:     Vec<FileEntry>,
    /// Freshly downloaded into the cache.
    pub downloaded: Vec<FileEntry>,
    /// Dequeued after an abort.
    pub skipped:    Vec<FileEntry>,
    pub failed:     Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool { self.failed.is_empty() }

    /// The per-file failures, or `None` when there were none.
    pub fn errors(&self) -> Option<&[FileFailure]> {
        if self.failed.is_empty() { None } else { Some(&self.failed) }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &FileEntry> { self.cached.iter().chain(&self.downloaded) }

    pub fn len(&self) -> usize { self.cached.len() + self.downloaded.len() + self.skipped.len() + self.failed.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Outcome of a bulk cache check.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub valid:      Vec<FileEntry>,
    /// Absent or corrupt in the cache.
    pub incomplete: Vec<FileEntry>,
    pub errors:     Vec<FileFailure>,
}

impl CheckReport {
    pub fn all_complete(&self) -> bool { self.incomplete.is_empty() && self.errors.is_empty() }
}
