use modsync_resource::FileEntry;
use tokio::sync::mpsc;

use super::progress::Progress;

/// Notifications for progress/UI observers. Observation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// A file is present and valid in the cache, fetched or not.
    FileCompleted { file: FileEntry, progress: Progress },
    /// An abort was issued for a download.
    AbortRequested,
    /// Every in-flight transfer has been told to cancel.
    AbortCompleted { cancelled: usize },
}

/// Optional channel that events are sent to. Sending never blocks and a
/// dropped receiver is ignored.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<mpsc::UnboundedSender<DownloadEvent>>);

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<DownloadEvent>) -> Self { Self(Some(tx)) }

    /// A sink and the receiver attached to it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DownloadEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn none() -> Self { Self(None) }

    pub fn emit(&self, event: DownloadEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}
