//! SpeedPipeline for combining detection with tracking and speed estimation.

use tracing::trace;

use crate::frame::Frame;
use crate::speed::{CrossingConfig, FrameReport, SpeedLimit, SpeedTracker};
use crate::tracker::TrackerConfig;

use super::{DetectionSource, VehicleClasses};

/// Bundles a `DetectionSource` with the vehicle filter and a `SpeedTracker`.
pub struct SpeedPipeline<D: DetectionSource> {
    detector: D,
    classes: VehicleClasses,
    tracker: SpeedTracker,
}

impl<D: DetectionSource> SpeedPipeline<D> {
    pub fn new(
        detector: D,
        classes: VehicleClasses,
        tracker_config: TrackerConfig,
        crossing_config: CrossingConfig,
    ) -> Self {
        Self {
            detector,
            classes,
            tracker: SpeedTracker::new(tracker_config, crossing_config),
        }
    }

    /// Create a pipeline with default classes, tracker and line geometry.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(
            detector,
            VehicleClasses::default(),
            TrackerConfig::default(),
            CrossingConfig::default(),
        )
    }

    /// Process a single frame.
    ///
    /// Runs detection, keeps the vehicle classes and advances tracking and
    /// speed estimation using the frame timestamp. A frame without vehicles
    /// still advances the tracker so missing identities age out.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
        limit: SpeedLimit,
    ) -> Result<FrameReport, D::Error> {
        let detections = self.detector.detect(frame)?;
        let boxes = self.classes.filter_boxes(&detections);
        trace!(
            sequence = frame.sequence,
            detections = detections.len(),
            vehicles = boxes.len(),
            "frame detections"
        );
        Ok(self.tracker.update(&boxes, frame.timestamp, limit))
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &SpeedTracker {
        &self.tracker
    }
}
