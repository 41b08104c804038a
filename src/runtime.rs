//! Threads and shared state around the speed pipeline.

mod limit_cell;
mod mailbox;
mod monitor;
mod poller;
mod reporter;
mod storage;

pub use limit_cell::SpeedLimitCell;
pub use mailbox::LatestFrame;
pub use monitor::{AnnotatedFrameSink, MonitorStats, SpeedMonitor};
pub use poller::{
    FileSpeedLimitSource, PollOutcome, SpeedLimitSource, poll_once, spawn_speed_limit_poller,
};
pub use reporter::{EncodedReport, OverspeedReport, OverspeedReporter, ReportQueue, ReporterPool};
pub use storage::{DirectoryReporter, LOG_FILE_NAME};
