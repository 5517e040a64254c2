use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use modsync_fetch::{
    CacheCheck, ContentCache, DownloadEvent, EventSink, FetchQueue, HttpClient, InFlight, Progress,
    ProgressTracker,
};
use modsync_install::{BundleSeeder, Installer, ModuleInfo, Resolution, VersionResolver};
use modsync_resource::Module;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::retry::retry_delay;
use crate::{DownloadError, DownloaderConfig, Result};

/// The module download service.
///
/// Owns the configuration, the content cache, the fetch queue and the
/// installer. Several modules may be downloaded at once through a shared
/// reference, each under its own cancellation token.
pub struct Downloader<C: HttpClient> {
    config:    DownloaderConfig,
    queue:     FetchQueue<C>,
    check:     CacheCheck,
    installer: Installer,
    seeder:    BundleSeeder,
    resolver:  VersionResolver,
    events:    EventSink,
}

#[cfg(feature = "reqwest")]
impl Downloader<modsync_fetch::ReqwestClient> {
    /// Build a downloader that talks HTTP through reqwest, honoring
    /// `config.proxy`.
    pub fn new(config: DownloaderConfig) -> Result<Self> {
        let client = modsync_fetch::ReqwestClient::with_proxy(config.proxy.as_deref())?;
        Ok(Self::with_client(config, Arc::new(client)))
    }
}

impl<C: HttpClient> Downloader<C> {
    pub fn with_client(config: DownloaderConfig, client: Arc<C>) -> Self {
        let cache = ContentCache::new(&config.cache_root);
        Self {
            queue: FetchQueue::new(client, cache.clone()).with_concurrency(config.concurrency),
            check: CacheCheck::new(cache.clone()),
            installer: Installer::new(&config.install_root, cache.clone()),
            seeder: BundleSeeder::new(&config.bundle_root, cache),
            resolver: VersionResolver::new(&config.install_root, &config.bundle_root),
            events: EventSink::none(),
            config,
        }
    }

    /// Send [`DownloadEvent`]s to `events`.
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &DownloaderConfig { &self.config }

    pub fn cache(&self) -> &ContentCache { self.queue.cache() }

    pub fn in_flight(&self) -> &Arc<InFlight> { self.queue.in_flight() }

    /// Fetch, check and install `module`.
    ///
    /// Each cycle fetches every file not already valid in the cache, then
    /// re-checks the whole module. A cycle with fetch failures or incomplete
    /// files is retried until `max_failures` cycles have failed. Once a cycle
    /// succeeds the files are installed and the manifest is written.
    ///
    /// `on_progress` runs after every file that becomes valid in the cache.
    /// Cancelling `cancel` at any point ends the download with
    /// [`DownloadError::Aborted`]; cached blobs are kept and an interrupted
    /// install gets no manifest.
    #[instrument(skip_all, fields(module = %module.id, version = %module.version))]
    pub async fn download_module<F>(
        &self,
        module: &Module,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<Progress>
    where
        F: Fn(Progress) + Sync,
    {
        let progress = ProgressTracker::new();
        let max_failures = self.config.max_failures.max(1);
        let mut failures = 0;

        info!(files = module.files.len(), total_bytes = module.total_size(), "download started");
        loop {
            let report = self
                .queue
                .run(&module.files, &progress, cancel, |file, snapshot| {
                    self.events.emit(DownloadEvent::FileCompleted {
                        file:     file.clone(),
                        progress: snapshot,
                    });
                    on_progress(snapshot);
                })
                .await?;

            let check = self.check.verify(&module.files, &progress).await;
            if cancel.is_cancelled() {
                return Err(DownloadError::Aborted);
            }

            if report.is_success() && check.all_complete() {
                self.installer.install(module, cancel).await?;
                if cancel.is_cancelled() {
                    return Err(DownloadError::Aborted);
                }
                self.installer.write_manifest(module).await?;
                info!("download complete");
                return Ok(progress.snapshot());
            }

            failures += 1;
            warn!(
                failures,
                max_failures,
                fetch_errors = report.failed.len(),
                incomplete = check.incomplete.len(),
                check_errors = check.errors.len(),
                "download cycle failed"
            );
            if failures >= max_failures {
                return Err(if report.failed.is_empty() {
                    DownloadError::ExhaustedRetries { attempts: failures }
                } else {
                    DownloadError::FetchFailed {
                        failures: report.failed,
                    }
                });
            }

            let delay = retry_delay(failures - 1, self.config.backoff_base());
            if !delay.is_zero() {
                debug!(?delay, "waiting before retry");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(DownloadError::Aborted),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    /// Abort the download driven by `cancel` and its transfers in flight.
    /// Downloads driven by other tokens keep running. Emits
    /// [`DownloadEvent::AbortRequested`], then exactly one
    /// [`DownloadEvent::AbortCompleted`] once the transfers have been told to
    /// stop. Returns the number of transfers cancelled.
    pub fn cancel_download(&self, cancel: &CancellationToken) -> usize {
        self.events.emit(DownloadEvent::AbortRequested);
        let cancelled = self.queue.abort(cancel);
        info!(cancelled, "download abort requested");
        self.events.emit(DownloadEvent::AbortCompleted { cancelled });
        cancelled
    }

    /// Import the bundle root into the cache. Returns the number of files.
    pub async fn seed_bundle(&self) -> Result<usize> { Ok(self.seeder.seed().await?) }

    pub async fn uninstall(&self, id: &str) -> Result<()> { Ok(self.installer.uninstall(id).await?) }

    pub async fn module_info(&self, id: &str) -> Result<ModuleInfo> { Ok(self.resolver.module_info(id).await?) }

    pub async fn resolve(&self, id: &str) -> Result<Resolution> { Ok(self.resolver.resolve(id).await?) }

    pub async fn list_modules(&self) -> Result<BTreeMap<String, Resolution>> {
        Ok(self.resolver.list_modules().await?)
    }

    pub async fn navigation_entry_point(&self, id: &str) -> Result<PathBuf> {
        Ok(self.resolver.navigation_entry_point(id).await?)
    }
}
