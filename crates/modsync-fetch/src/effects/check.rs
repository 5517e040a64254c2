use futures_util::StreamExt;
use futures_util::stream;
use modsync_resource::FileEntry;
use tracing::{debug, info};

use crate::data::{CheckReport, FileFailure, ProgressTracker};
use crate::effects::cache::{CacheState, ContentCache};
use crate::Result;

/// Width of the bulk check pool. Independent of the fetch queue's setting.
pub const CHECK_CONCURRENCY: usize = 5;

/// Re-checks a whole module against the cache after a fetch batch.
#[derive(Debug, Clone)]
pub struct CacheCheck {
    cache: ContentCache,
}

impl CacheCheck {
    pub fn new(cache: ContentCache) -> Self { Self { cache } }

    /// Check every file in `files`.
    ///
    /// Each file that is not present and valid, including files whose check
    /// failed with an error, has its declared size taken back out of
    /// `progress`. Errors are collected; the remaining checks still run.
    pub async fn verify(&self, files: &[FileEntry], progress: &ProgressTracker) -> CheckReport {
        let checks: Vec<_> = files.iter().map(|file| self.check_one(file)).collect();
        let mut results = stream::iter(checks).buffer_unordered(CHECK_CONCURRENCY);

        let mut report = CheckReport::default();
        while let Some((file, state)) = results.next().await {
            match state {
                Ok(CacheState::Valid) => report.valid.push(file.clone()),
                Ok(state) => {
                    debug!(sha = %file.sha, ?state, "file incomplete");
                    progress.rollback(file.size);
                    report.incomplete.push(file.clone());
                }
                Err(error) => {
                    progress.rollback(file.size);
                    report.errors.push(FileFailure {
                        file: file.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            valid = report.valid.len(),
            incomplete = report.incomplete.len(),
            errors = report.errors.len(),
            "cache check finished"
        );
        report
    }

    async fn check_one<'a>(&self, file: &'a FileEntry) -> (&'a FileEntry, Result<CacheState>) {
        (file, self.cache.has(file).await)
    }
}
