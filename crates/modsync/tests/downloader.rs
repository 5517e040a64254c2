use std::sync::{Arc, Mutex};
use std::time::Duration;

use modsync::{
    Algorithm, CancellationToken, DownloadError, DownloadEvent, Downloader, DownloaderConfig, EventSink, FileEntry,
    Location, Module, SemVer,
};
use modsync_fetch::testing::MockHttpClient;
use tempfile::{TempDir, tempdir};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn entry(sha: &str, body: &str, local_path: &str, local_name: &str) -> FileEntry {
    FileEntry::new(
        sha,
        format!("{:x}", md5::compute(body)),
        format!("https://cdn.test/{sha}"),
        body.len() as u64,
        local_path,
        local_name,
    )
}

struct Fixture {
    dir:    TempDir,
    client: Arc<MockHttpClient>,
}

impl Fixture {
    fn new(client: MockHttpClient) -> Self {
        init_tracing();
        Self {
            dir:    tempdir().unwrap(),
            client: Arc::new(client),
        }
    }

    fn config(&self) -> DownloaderConfig { DownloaderConfig::default().rooted_at(self.dir.path()) }

    fn downloader(&self) -> Downloader<MockHttpClient> { self.downloader_with(self.config()) }

    fn downloader_with(&self, config: DownloaderConfig) -> Downloader<MockHttpClient> {
        Downloader::with_client(config, Arc::clone(&self.client))
    }

    fn path(&self, rel: &str) -> std::path::PathBuf { self.dir.path().join(rel) }
}

fn lesson() -> (Module, MockHttpClient) {
    let index = entry("s-index", "<html>lesson</html>", "/", "index.html");
    let audio = entry("s-audio", "RIFF....WAVE", "audio", "intro.wav");
    let client = MockHttpClient::new()
        .with_body(&index.url, "<html>lesson</html>")
        .with_body(&audio.url, "RIFF....WAVE");
    (Module::new("lesson", "1.2.0", vec![index, audio]), client)
}

#[tokio::test]
async fn successful_cycle_installs_files_and_manifest() {
    let (module, client) = lesson();
    let fx = Fixture::new(client);
    let (events, mut rx) = EventSink::channel();
    let downloader = fx.downloader().with_events(events);
    let seen = Mutex::new(Vec::new());

    let progress = downloader
        .download_module(&module, &CancellationToken::new(), |p| seen.lock().unwrap().push(p))
        .await
        .unwrap();

    assert!(progress.is_complete());
    assert_eq!(progress.total_bytes, module.total_size());
    assert_eq!(seen.lock().unwrap().len(), 2);

    let root = fx.path("installed/lesson");
    assert_eq!(std::fs::read_to_string(root.join("index.html")).unwrap(), "<html>lesson</html>");
    assert_eq!(std::fs::read_to_string(root.join("audio/intro.wav")).unwrap(), "RIFF....WAVE");
    assert_eq!(std::fs::read_to_string(root.join("version.json")).unwrap(), r#"{"version":"1.2.0"}"#);

    let mut completed = 0;
    while let Ok(event) = rx.try_recv() {
        assert!(matches!(event, DownloadEvent::FileCompleted { .. }));
        completed += 1;
    }
    assert_eq!(completed, 2);

    let resolution = downloader.resolve("lesson").await.unwrap();
    assert_eq!(resolution.location, Location::Installed);
    assert_eq!(resolution.version, SemVer::new(1, 2, 0));
    assert_eq!(
        downloader.navigation_entry_point("lesson").await.unwrap(),
        root.join("index.html")
    );
}

#[tokio::test]
async fn cached_files_are_not_fetched_again() {
    let (module, client) = lesson();
    let fx = Fixture::new(client);
    let downloader = fx.downloader();

    downloader
        .download_module(&module, &CancellationToken::new(), |_| {})
        .await
        .unwrap();
    assert_eq!(fx.client.requests(), 2);

    downloader.uninstall("lesson").await.unwrap();
    downloader
        .download_module(&module, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(fx.client.requests(), 2);
    assert!(fx.path("installed/lesson/index.html").exists());
}

#[tokio::test]
async fn modules_sharing_a_blob_fetch_it_once() {
    let fx = Fixture::new(MockHttpClient::new().with_body("https://cdn.test/s-logo", "logo"));
    let downloader = fx.downloader();

    let first = Module::new("first", "1.0.0", vec![entry("s-logo", "logo", "img", "logo.png")]);
    let mut shared = entry("s-logo", "logo", "/", "brand.png");
    shared.url = "https://mirror.test/brand.png".to_string();
    let second = Module::new("second", "1.0.0", vec![shared.clone()]);

    downloader
        .download_module(&first, &CancellationToken::new(), |_| {})
        .await
        .unwrap();
    let blob = fx.path("downloadCache/s-logo");
    let mtime = std::fs::metadata(&blob).unwrap().modified().unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    downloader
        .download_module(&second, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(fx.client.requests_for(&shared.url), 0);
    assert_eq!(std::fs::metadata(&blob).unwrap().modified().unwrap(), mtime);
    assert_eq!(std::fs::read_to_string(fx.path("installed/second/brand.png")).unwrap(), "logo");
}

#[tokio::test]
async fn never_verifying_file_exhausts_retries() {
    let file = entry("s-bad", "expected bytes", "/", "index.html");
    let fx = Fixture::new(MockHttpClient::new().with_body(&file.url, "different bytes"));
    let downloader = fx.downloader();
    let module = Module::new("broken", "1.0.0", vec![file.clone()]);

    let err = downloader
        .download_module(&module, &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::ExhaustedRetries { attempts: 3 }), "{err:?}");
    assert_eq!(fx.client.requests_for(&file.url), 3);
    assert!(!fx.path("installed/broken").exists());
}

#[tokio::test]
async fn persistent_fetch_failure_reports_the_fetch_errors() {
    let good = entry("s-good", "fine", "/", "index.html");
    let bad = entry("s-down", "unreachable", "/", "data.json");
    let fx = Fixture::new(
        MockHttpClient::new()
            .with_body(&good.url, "fine")
            .with_failure(&bad.url, "connection refused"),
    );
    let downloader = fx.downloader_with(fx.config().max_failures(2));
    let module = Module::new("partial", "1.0.0", vec![good.clone(), bad.clone()]);
    let seen = Mutex::new(Vec::new());

    let err = downloader
        .download_module(&module, &CancellationToken::new(), |p| seen.lock().unwrap().push(p))
        .await
        .unwrap_err();

    let failures = match err {
        DownloadError::FetchFailed { failures } => failures,
        other => panic!("expected fetch failure, got {other:?}"),
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].file, bad);
    assert_eq!(fx.client.requests_for(&bad.url), 2);
    assert_eq!(fx.client.requests_for(&good.url), 1);

    // Declared-size accounting never reaches the total while a file is missing.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|p| p.bytes_transferred == good.size as i64));
    assert!(seen.iter().all(|p| !p.is_complete()));
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let file = entry("s-flaky", "eventually", "/", "index.html");
    let fx = Fixture::new(MockHttpClient::new().with_flaky(&file.url, 1, "eventually"));
    let downloader = fx.downloader();
    let module = Module::new("flaky", "2.0.0", vec![file.clone()]);

    downloader
        .download_module(&module, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(fx.client.requests_for(&file.url), 2);
    assert!(fx.path("installed/flaky/index.html").exists());
}

#[tokio::test]
async fn abort_mid_cycle_reports_aborted_once() {
    let slow = entry("s-slow", "a large payload that never finishes", "/", "big.bin");
    let fx = Fixture::new(MockHttpClient::new().with_hang(&slow.url, "a large payload that never finishes"));
    let (events, mut rx) = EventSink::channel();
    let downloader = Arc::new(fx.downloader().with_events(events));
    let module = Module::new("slow", "1.0.0", vec![slow]);
    let cancel = CancellationToken::new();

    let task = {
        let downloader = Arc::clone(&downloader);
        let cancel = cancel.clone();
        tokio::spawn(async move { downloader.download_module(&module, &cancel, |_| {}).await })
    };

    while downloader.in_flight().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(downloader.cancel_download(&cancel), 1);

    let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert!(matches!(result, Err(DownloadError::Aborted)));
    assert!(downloader.in_flight().is_empty());

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events, vec![
        DownloadEvent::AbortRequested,
        DownloadEvent::AbortCompleted { cancelled: 1 },
    ]);
    assert!(!fx.path("installed/slow").exists());
}

#[tokio::test]
async fn abort_interrupts_retry_backoff() {
    let file = entry("s-down", "never", "/", "index.html");
    let fx = Fixture::new(MockHttpClient::new().with_failure(&file.url, "connection refused"));
    let downloader = Arc::new(fx.downloader_with(fx.config().retry_backoff(Duration::from_secs(3600))));
    let module = Module::new("down", "1.0.0", vec![file.clone()]);
    let cancel = CancellationToken::new();

    let task = {
        let downloader = Arc::clone(&downloader);
        let cancel = cancel.clone();
        tokio::spawn(async move { downloader.download_module(&module, &cancel, |_| {}).await })
    };

    while fx.client.requests_for(&file.url) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    downloader.cancel_download(&cancel);

    let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert!(result.unwrap_err().is_aborted());
    assert_eq!(fx.client.requests_for(&file.url), 1);
}

#[tokio::test]
async fn seeding_a_bundle_adds_one_blob_per_file() {
    let fx = Fixture::new(MockHttpClient::new());
    let bundled = fx.path("bundled/lesson");
    std::fs::create_dir_all(&bundled).unwrap();
    std::fs::write(bundled.join("index.html"), "hello world").unwrap();

    let downloader = fx.downloader();
    assert_eq!(downloader.seed_bundle().await.unwrap(), 1);

    let sha256 = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    let blob = fx.path("downloadCache").join(sha256);
    assert!(blob.is_file());
    assert_eq!(
        downloader.cache().digest(&blob, Algorithm::Sha256).await.unwrap().as_deref(),
        Some(sha256)
    );
    assert_eq!(std::fs::read_dir(fx.path("downloadCache")).unwrap().count(), 1);
}

#[tokio::test]
async fn directory_digest_is_none() {
    let fx = Fixture::new(MockHttpClient::new());
    std::fs::create_dir_all(fx.path("some/dir")).unwrap();

    let digest = fx.downloader().cache().digest(fx.path("some/dir"), Algorithm::Md5).await.unwrap();
    assert_eq!(digest, None);
}

#[tokio::test]
async fn bundled_copy_wins_until_a_newer_install() {
    let (module, client) = lesson();
    let fx = Fixture::new(client);
    std::fs::create_dir_all(fx.path("bundled/lesson")).unwrap();
    std::fs::write(fx.path("bundled/lesson/version.json"), r#"{"version":"1.5.0"}"#).unwrap();
    let downloader = fx.downloader();

    downloader
        .download_module(&module, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    let info = downloader.module_info("lesson").await.unwrap();
    assert_eq!(info.installed.unwrap().version.as_deref(), Some("1.2.0"));
    assert_eq!(info.bundled.unwrap().version.as_deref(), Some("1.5.0"));

    let modules = downloader.list_modules().await.unwrap();
    assert_eq!(modules["lesson"].location, Location::Bundled);
    assert_eq!(modules["lesson"].version, SemVer::new(1, 5, 0));
}

fn assert_send<T: Send>(_: &T) {}

#[test]
fn download_future_can_be_spawned() {
    let (module, client) = lesson();
    let fx = Fixture::new(client);
    let downloader = fx.downloader();
    let cancel = CancellationToken::new();

    let download = downloader.download_module(&module, &cancel, |_| {});
    assert_send(&download);
}

#[tokio::test]
async fn aborting_one_module_leaves_another_running() {
    let stuck = entry("s-stuck", "stuck forever", "/", "index.html");
    let gated = entry("s-gated", "released later", "/", "index.html");
    let fx = Fixture::new(
        MockHttpClient::new()
            .with_hang(&stuck.url, "stuck forever")
            .with_gate(&gated.url, "released later"),
    );
    let (events, mut rx) = EventSink::channel();
    let downloader = Arc::new(fx.downloader_with(fx.config().max_failures(1)).with_events(events));
    let first = CancellationToken::new();
    let second = CancellationToken::new();

    let spawn_download = |module: Module, cancel: CancellationToken| {
        let downloader = Arc::clone(&downloader);
        tokio::spawn(async move { downloader.download_module(&module, &cancel, |_| {}).await })
    };
    let aborted = spawn_download(Module::new("stuck", "1.0.0", vec![stuck]), first.clone());
    let survivor = spawn_download(Module::new("gated", "1.0.0", vec![gated.clone()]), second.clone());

    while downloader.in_flight().len() < 2 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(downloader.cancel_download(&first), 1);
    fx.client.open_gate(&gated.url);

    let aborted = tokio::time::timeout(Duration::from_secs(5), aborted).await.unwrap().unwrap();
    let survivor = tokio::time::timeout(Duration::from_secs(5), survivor).await.unwrap().unwrap();
    assert!(matches!(aborted, Err(DownloadError::Aborted)));
    assert!(survivor.unwrap().is_complete());
    assert!(!second.is_cancelled());
    assert_eq!(fx.client.requests_for(&gated.url), 1);
    assert_eq!(
        std::fs::read_to_string(fx.path("installed/gated/index.html")).unwrap(),
        "released later"
    );

    let mut abort_completed = 0;
    while let Ok(event) = rx.try_recv() {
        if let DownloadEvent::AbortCompleted { cancelled } = event {
            assert_eq!(cancelled, 1);
            abort_completed += 1;
        }
    }
    assert_eq!(abort_completed, 1);
}

#[tokio::test]
async fn abort_after_the_last_file_skips_install() {
    let (module, client) = lesson();
    let fx = Fixture::new(client);
    let downloader = fx.downloader();
    let cancel = CancellationToken::new();
    let total = module.total_size() as i64;

    let err = downloader
        .download_module(&module, &cancel, |p| {
            if p.bytes_transferred == total {
                cancel.cancel();
            }
        })
        .await
        .unwrap_err();

    assert!(err.is_aborted());
    assert!(!fx.path("installed/lesson").exists());
    assert!(fx.path("downloadCache/s-index").exists());
    assert!(fx.path("downloadCache/s-audio").exists());
}
