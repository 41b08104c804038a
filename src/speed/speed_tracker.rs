//! Per-frame composition of identity tracking, crossing detection and speed
//! estimation.

use nalgebra::Point2;
use tracing::{info, warn};

use crate::speed::board::{SpeedBoard, SpeedRecord};
use crate::speed::crossing::{CrossingConfig, CrossingDetector};
use crate::speed::estimator::SpeedEstimator;
use crate::speed::limit::SpeedLimit;
use crate::tracker::{CentroidTracker, Rect, TrackerConfig};

/// One tracked vehicle in a processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleObservation {
    pub track_id: u64,
    pub bbox: Rect,
    pub centroid: Point2<f32>,
    /// Cached speed, present once the vehicle has completed a transit.
    pub speed: Option<SpeedRecord>,
}

/// A vehicle measured above the limit in effect for its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverspeedEvent {
    pub track_id: u64,
    pub speed_kmh: f64,
    pub limit: SpeedLimit,
    /// Box at the moment of the SECOND crossing
    pub region: Rect,
    /// Frame timestamp of the SECOND crossing, seconds since the epoch
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub timestamp: f64,
    pub vehicles: Vec<VehicleObservation>,
    /// Speeds computed during this frame
    pub measured: Vec<SpeedRecord>,
    pub overspeed: Vec<OverspeedEvent>,
    pub retired: Vec<u64>,
}

pub struct SpeedTracker {
    tracker: CentroidTracker,
    crossings: CrossingDetector,
    estimator: SpeedEstimator,
    board: SpeedBoard,
}

impl SpeedTracker {
    pub fn new(tracker_config: TrackerConfig, crossing_config: CrossingConfig) -> Self {
        let estimator = SpeedEstimator::new(crossing_config.distance_m);
        Self {
            tracker: CentroidTracker::new(tracker_config),
            crossings: CrossingDetector::new(crossing_config),
            estimator,
            board: SpeedBoard::new(),
        }
    }

    /// Process the vehicle boxes of one frame observed at `now`, comparing
    /// fresh speeds against `limit`.
    pub fn update(&mut self, boxes: &[Rect], now: f64, limit: SpeedLimit) -> FrameReport {
        let update = self.tracker.update(boxes);

        for &track_id in &update.retired {
            self.crossings.forget(track_id);
            self.board.forget(track_id);
        }

        let mut report = FrameReport {
            timestamp: now,
            retired: update.retired,
            ..FrameReport::default()
        };

        for assigned in update.assignments {
            let track_id = assigned.track_id;

            if let Some(transit) = self.crossings.observe(track_id, assigned.centroid.y, now) {
                let elapsed = transit.elapsed();
                let speed = self.estimator.estimate(elapsed);
                let record = self.board.record(track_id, speed);
                report.measured.push(record);

                match speed {
                    Some(speed_kmh) => {
                        info!(track_id, speed_kmh, elapsed, "speed measured");
                        if limit.is_exceeded_by(speed_kmh) && self.board.mark_reported(track_id) {
                            warn!(track_id, speed_kmh, limit = limit.kmh(), "overspeed");
                            report.overspeed.push(OverspeedEvent {
                                track_id,
                                speed_kmh,
                                limit,
                                region: assigned.bbox,
                                timestamp: now,
                            });
                        }
                    }
                    None => warn!(track_id, elapsed, "no speed for non-positive transit time"),
                }
            }

            report.vehicles.push(VehicleObservation {
                track_id,
                bbox: assigned.bbox,
                centroid: assigned.centroid,
                speed: self.board.get(track_id).copied(),
            });
        }

        report
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    pub fn crossings(&self) -> &CrossingDetector {
        &self.crossings
    }

    pub fn board(&self) -> &SpeedBoard {
        &self.board
    }
}
