//! Background delivery of overspeed reports.
//!
//! The processing loop hands reports to a bounded queue and moves on. A fixed
//! set of worker threads encodes the crops and calls the storage
//! collaborator. A full queue drops the report with a warning; a failed
//! delivery is logged and not retried.

use std::io::Cursor;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Local, Utc};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as PixelRect;
use tracing::{debug, error, info, warn};

use crate::error::ReportError;
use crate::frame::Frame;
use crate::speed::OverspeedEvent;

const BORDER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BORDER_THICKNESS: u32 = 3;

/// An overspeed event with the cropped vehicle image, ready to deliver.
#[derive(Debug, Clone)]
pub struct OverspeedReport {
    pub track_id: u64,
    pub speed_kmh: f64,
    pub captured_at: DateTime<Local>,
    pub crop: RgbImage,
}

impl OverspeedReport {
    /// Cut the event region out of `frame`.
    pub fn from_event(event: &OverspeedEvent, frame: &Frame) -> Result<Self, ReportError> {
        let region = event
            .region
            .pixel_region(frame.width(), frame.height())
            .ok_or(ReportError::EmptyRegion(event.track_id))?;
        let crop = image::imageops::crop_imm(
            &frame.image,
            region.x,
            region.y,
            region.width,
            region.height,
        )
        .to_image();

        Ok(Self {
            track_id: event.track_id,
            speed_kmh: event.speed_kmh,
            captured_at: local_time(event.timestamp),
            crop,
        })
    }

    /// JPEG bytes of the crop with a red border drawn around it.
    pub fn encode_jpeg(&self) -> Result<Vec<u8>, ReportError> {
        let mut marked = self.crop.clone();
        let (w, h) = marked.dimensions();
        for inset in 0..BORDER_THICKNESS {
            if w <= 2 * inset || h <= 2 * inset {
                break;
            }
            let rect = PixelRect::at(inset as i32, inset as i32)
                .of_size(w - 2 * inset, h - 2 * inset);
            draw_hollow_rect_mut(&mut marked, rect, BORDER_COLOR);
        }

        let mut bytes = Vec::new();
        marked.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
        Ok(bytes)
    }
}

/// What the storage collaborator receives.
#[derive(Debug, Clone)]
pub struct EncodedReport {
    pub track_id: u64,
    pub speed_kmh: f64,
    pub captured_at: DateTime<Local>,
    pub jpeg: Vec<u8>,
}

/// Storage collaborator for overspeed events. Returns where the image ended
/// up (a URL or path).
pub trait OverspeedReporter: Send + Sync {
    fn report(&self, report: &EncodedReport) -> Result<String, ReportError>;
}

/// Non-blocking handle used by the processing loop.
#[derive(Clone)]
pub struct ReportQueue {
    sender: Sender<OverspeedReport>,
}

impl ReportQueue {
    /// Enqueue without blocking. Returns `false` when the report was dropped.
    pub fn submit(&self, report: OverspeedReport) -> bool {
        match self.sender.try_send(report) {
            Ok(()) => true,
            Err(TrySendError::Full(report)) => {
                warn!(
                    track_id = report.track_id,
                    speed_kmh = report.speed_kmh,
                    "report queue full, dropping overspeed report"
                );
                false
            }
            Err(TrySendError::Disconnected(report)) => {
                error!(
                    track_id = report.track_id,
                    "report workers are gone, dropping overspeed report"
                );
                false
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

pub struct ReporterPool {
    queue: Option<ReportQueue>,
    workers: Vec<JoinHandle<()>>,
}

impl ReporterPool {
    /// Start `workers` threads draining a queue of `capacity` reports.
    pub fn spawn(reporter: Arc<dyn OverspeedReporter>, workers: usize, capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        let workers = (0..workers.max(1))
            .map(|idx| {
                let receiver = receiver.clone();
                let reporter = Arc::clone(&reporter);
                thread::Builder::new()
                    .name(format!("overspeed-reporter-{idx}"))
                    .spawn(move || worker_loop(idx, receiver, reporter))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    error!("failed to spawn report worker: {e}");
                    None
                }
            })
            .collect();

        Self {
            queue: Some(ReportQueue { sender }),
            workers,
        }
    }

    /// A handle for submitting reports. `None` after `shutdown`.
    pub fn queue(&self) -> Option<ReportQueue> {
        self.queue.clone()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue, let the workers finish what is already queued and
    /// join them. Outstanding `ReportQueue` clones keep the workers alive
    /// until they are dropped.
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        self.queue.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("report worker panicked");
            }
        }
    }
}

impl Drop for ReporterPool {
    fn drop(&mut self) {
        self.join();
    }
}

fn worker_loop(
    idx: usize,
    receiver: Receiver<OverspeedReport>,
    reporter: Arc<dyn OverspeedReporter>,
) {
    debug!(worker = idx, "report worker started");
    while let Ok(report) = receiver.recv() {
        let track_id = report.track_id;
        match deliver(&report, reporter.as_ref()) {
            Ok(location) => {
                info!(track_id, speed_kmh = report.speed_kmh, %location, "overspeed stored");
            }
            Err(e) => error!(track_id, "failed to store overspeed report: {e}"),
        }
    }
    debug!(worker = idx, "report worker stopped");
}

fn deliver(
    report: &OverspeedReport,
    reporter: &dyn OverspeedReporter,
) -> Result<String, ReportError> {
    let jpeg = report.encode_jpeg()?;
    reporter.report(&EncodedReport {
        track_id: report.track_id,
        speed_kmh: report.speed_kmh,
        captured_at: report.captured_at,
        jpeg,
    })
}

fn local_time(timestamp: f64) -> DateTime<Local> {
    DateTime::<Utc>::from_timestamp_millis((timestamp * 1000.0) as i64)
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(Local::now)
}
