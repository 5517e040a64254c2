//! Data layer: progress accounting, events and batch reports.

mod events;
mod progress;
mod report;

pub use events::{DownloadEvent, EventSink};
pub use progress::{Progress, ProgressTracker};
pub use report::{BatchReport, CheckReport, FileFailure};
