//! Line-crossing speed estimation on top of the identity tracker.

mod board;
mod crossing;
mod estimator;
mod limit;
mod speed_tracker;

pub use board::{SpeedBoard, SpeedRecord};
pub use crossing::{CrossingConfig, CrossingDetector, CrossingRecord, Line, Transit};
pub use estimator::SpeedEstimator;
pub use limit::SpeedLimit;
pub use speed_tracker::{FrameReport, OverspeedEvent, SpeedTracker, VehicleObservation};
