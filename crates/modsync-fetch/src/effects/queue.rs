//! Bounded-concurrency fetching into the content cache.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use modsync_resource::FileEntry;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::data::{BatchReport, FileFailure, Progress, ProgressTracker};
use crate::effects::cache::{CacheState, ContentCache};
use crate::effects::http::HttpClient;
use crate::effects::transfer::InFlight;
use crate::{FetchError, Result};

/// Default number of files fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

enum Outcome {
    Cached,
    Downloaded,
    Skipped,
    Failed(FetchError),
}

/// Worker pool that pulls files into a [`ContentCache`].
pub struct FetchQueue<C: HttpClient> {
    client:      Arc<C>,
    cache:       ContentCache,
    concurrency: usize,
    in_flight:   Arc<InFlight>,
}

impl<C: HttpClient> FetchQueue<C> {
    pub fn new(client: Arc<C>, cache: ContentCache) -> Self {
        Self {
            client,
            cache,
            concurrency: DEFAULT_CONCURRENCY,
            in_flight: InFlight::new(),
        }
    }

    /// Set the pool width, clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn concurrency(&self) -> usize { self.concurrency }

    pub fn cache(&self) -> &ContentCache { &self.cache }

    pub fn in_flight(&self) -> &Arc<InFlight> { &self.in_flight }

    /// Abort the batch driven by `cancel`: files not yet started are skipped
    /// and the batch's transfers are cancelled. Batches run with other tokens
    /// are unaffected. Returns the number of transfers that were told to stop.
    pub fn abort(&self, cancel: &CancellationToken) -> usize { self.in_flight.cancel_batch(cancel) }

    /// Fetch `files` into the cache.
    ///
    /// `progress` is reset to the batch's declared total first. Files already
    /// present and valid are reported without network access. Per-file
    /// failures are collected in the report and never stop the batch.
    /// `on_file` runs for every file that ends up valid in the cache.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Aborted`] instead of a report once `cancel` has
    /// fired; the batch still winds down every file before returning.
    pub async fn run<F>(
        &self,
        files: &[FileEntry],
        progress: &ProgressTracker,
        cancel: &CancellationToken,
        on_file: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&FileEntry, Progress) + Sync,
    {
        let total = files.iter().map(|f| f.size).sum();
        progress.reset(total);
        info!(files = files.len(), total_bytes = total, concurrency = self.concurrency, "fetch batch started");

        let semaphore = Semaphore::new(self.concurrency);
        let mut pending: FuturesUnordered<_> = files
            .iter()
            .map(|file| self.fetch_one(file, &semaphore, progress, cancel, &on_file))
            .collect();

        let mut report = BatchReport::default();
        while let Some((file, outcome)) = pending.next().await {
            match outcome {
                Outcome::Cached => report.cached.push(file.clone()),
                Outcome::Downloaded => report.downloaded.push(file.clone()),
                Outcome::Skipped => report.skipped.push(file.clone()),
                Outcome::Failed(error) => {
                    warn!(sha = %file.sha, url = %file.url, %error, "file fetch failed");
                    report.failed.push(FileFailure {
                        file: file.clone(),
                        error,
                    });
                }
            }
        }

        if cancel.is_cancelled() {
            info!(skipped = report.skipped.len(), "fetch batch aborted");
            return Err(FetchError::Aborted);
        }

        info!(
            cached = report.cached.len(),
            downloaded = report.downloaded.len(),
            failed = report.failed.len(),
            "fetch batch finished"
        );
        Ok(report)
    }

    async fn fetch_one<'a, F>(
        &self,
        file: &'a FileEntry,
        semaphore: &Semaphore,
        progress: &ProgressTracker,
        cancel: &CancellationToken,
        on_file: &F,
    ) -> (&'a FileEntry, Outcome)
    where
        F: Fn(&FileEntry, Progress) + Sync,
    {
        let Ok(_permit) = semaphore.acquire().await else {
            return (file, Outcome::Skipped);
        };
        if cancel.is_cancelled() {
            return (file, Outcome::Skipped);
        }

        match self.cache.has(file).await {
            Ok(CacheState::Valid) => {
                debug!(sha = %file.sha, "cache hit");
                on_file(file, progress.complete(file.size));
                return (file, Outcome::Cached);
            }
            Ok(_) => {}
            Err(e) => return (file, Outcome::Failed(e)),
        }

        let transfer = self.in_flight.begin(cancel);
        debug!(sha = %file.sha, transfer = %transfer.id(), "download started");
        let result = tokio::select! {
            biased;
            _ = transfer.token().cancelled() => Err(FetchError::Aborted),
            r = self.download(file) => r,
        };
        drop(transfer);

        match result {
            Ok(bytes) => {
                debug!(sha = %file.sha, bytes, "download finished");
                on_file(file, progress.complete(file.size));
                (file, Outcome::Downloaded)
            }
            Err(FetchError::Aborted) if cancel.is_cancelled() => (file, Outcome::Skipped),
            Err(e) => (file, Outcome::Failed(e)),
        }
    }

    async fn download(&self, file: &FileEntry) -> Result<u64> {
        let body = self
            .client
            .stream(&file.url)
            .await
            .map_err(|e| FetchError::network(&file.url, e))?;
        self.cache.store(file, body).await
    }
}
