//! The processing loop: latest frame in, tracked speeds and overspeed
//! reports out.

use std::fmt::Display;
use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::annotate::Annotator;
use crate::frame::Frame;
use crate::integration::{DetectionSource, SpeedPipeline};
use crate::speed::FrameReport;

use super::limit_cell::SpeedLimitCell;
use super::mailbox::LatestFrame;
use super::reporter::{OverspeedReport, ReportQueue};

/// Receives the annotated frame after each processed frame.
pub trait AnnotatedFrameSink {
    fn publish(&mut self, frame: &Frame, annotated: &RgbImage, report: &FrameReport);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub frames: u64,
    pub failed_frames: u64,
    pub overspeed_events: u64,
    pub reports_queued: u64,
    pub reports_dropped: u64,
}

pub struct SpeedMonitor<D: DetectionSource> {
    pipeline: SpeedPipeline<D>,
    frames: Arc<LatestFrame>,
    limit: Arc<SpeedLimitCell>,
    reports: ReportQueue,
    frame_size: (u32, u32),
    annotator: Option<(Annotator, Box<dyn AnnotatedFrameSink + Send>)>,
    stats: MonitorStats,
}

impl<D> SpeedMonitor<D>
where
    D: DetectionSource,
    D::Error: Display,
{
    pub fn new(
        pipeline: SpeedPipeline<D>,
        frames: Arc<LatestFrame>,
        limit: Arc<SpeedLimitCell>,
        reports: ReportQueue,
        frame_size: (u32, u32),
    ) -> Self {
        Self {
            pipeline,
            frames,
            limit,
            reports,
            frame_size,
            annotator: None,
            stats: MonitorStats::default(),
        }
    }

    /// Draw every processed frame and hand it to `sink`.
    pub fn with_annotations(
        mut self,
        annotator: Annotator,
        sink: Box<dyn AnnotatedFrameSink + Send>,
    ) -> Self {
        self.annotator = Some((annotator, sink));
        self
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn pipeline(&self) -> &SpeedPipeline<D> {
        &self.pipeline
    }

    /// Process frames until the mailbox is closed and drained.
    pub fn run(&mut self) -> MonitorStats {
        info!(
            width = self.frame_size.0,
            height = self.frame_size.1,
            "speed monitor started"
        );
        while let Some(frame) = self.frames.wait_latest() {
            self.step(frame);
        }
        info!(
            frames = self.stats.frames,
            failed = self.stats.failed_frames,
            dropped_frames = self.frames.dropped(),
            overspeed = self.stats.overspeed_events,
            "speed monitor stopped"
        );
        self.stats
    }

    /// Process one frame. Errors are logged and contained in this frame.
    pub fn step(&mut self, frame: Frame) -> Option<FrameReport> {
        let limit = self.limit.get();
        let (width, height) = self.frame_size;
        let frame = frame.resized(width, height);
        self.stats.frames += 1;

        let report = match self.pipeline.process_frame(&frame, limit) {
            Ok(report) => report,
            Err(e) => {
                self.stats.failed_frames += 1;
                warn!(sequence = frame.sequence, "skipping frame: {e}");
                return None;
            }
        };
        debug!(
            sequence = frame.sequence,
            vehicles = report.vehicles.len(),
            limit = limit.kmh(),
            "frame processed"
        );

        for event in &report.overspeed {
            self.stats.overspeed_events += 1;
            match OverspeedReport::from_event(event, &frame) {
                Ok(overspeed) => {
                    if self.reports.submit(overspeed) {
                        self.stats.reports_queued += 1;
                    } else {
                        self.stats.reports_dropped += 1;
                    }
                }
                Err(e) => {
                    self.stats.reports_dropped += 1;
                    warn!(
                        track_id = event.track_id,
                        "cannot build overspeed report: {e}"
                    );
                }
            }
        }

        if let Some((annotator, sink)) = self.annotator.as_mut() {
            let annotated = annotator.draw(&frame.image, &report);
            sink.publish(&frame, &annotated, &report);
        }

        Some(report)
    }
}
