use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Snapshot of a module download's declared-size progress.
///
/// `bytes_transferred` is signed: files that fail bulk verification are rolled
/// back by their declared size even when they were never counted in the
/// current batch, so the value can dip below zero during retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub bytes_transferred: i64,
    pub total_bytes:       u64,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`, `None` for an empty module.
    pub fn fraction(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        let done = self.bytes_transferred.max(0) as f64;
        Some((done / self.total_bytes as f64).min(1.0))
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_transferred >= 0 && self.bytes_transferred as u64 == self.total_bytes
    }
}

/// Shared progress counter for one in-flight module download.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    transferred: AtomicI64,
    total:       AtomicU64,
}

impl ProgressTracker {
    pub fn new() -> Self { Self::default() }

    /// Start a new batch over `total_bytes`.
    pub fn reset(&self, total_bytes: u64) {
        self.transferred.store(0, Ordering::SeqCst);
        self.total.store(total_bytes, Ordering::SeqCst);
    }

    /// Count a file as present and valid.
    pub fn complete(&self, size: u64) -> Progress {
        self.transferred.fetch_add(signed(size), Ordering::SeqCst);
        self.snapshot()
    }

    /// Take a file back out after it failed verification.
    pub fn rollback(&self, size: u64) -> Progress {
        self.transferred.fetch_sub(signed(size), Ordering::SeqCst);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            bytes_transferred: self.transferred.load(Ordering::SeqCst),
            total_bytes:       self.total.load(Ordering::SeqCst),
        }
    }
}

fn signed(size: u64) -> i64 { i64::try_from(size).unwrap_or(i64::MAX) }
