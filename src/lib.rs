//! Vehicle speed measurement from roadside camera frames.
//!
//! Detections are turned into stable identities by a greedy nearest-centroid
//! tracker ([`tracker`]), timed between two horizontal reference lines
//! ([`speed`]) and, when over the limit, reported once per vehicle through a
//! background worker pool ([`runtime`]).

pub mod annotate;
pub mod config;
pub mod error;
pub mod frame;
pub mod integration;
pub mod runtime;
pub mod speed;
pub mod tracker;

pub use config::AppConfig;
pub use error::{ConfigError, FrameError, ReplayError, ReportError, SourceError};
pub use frame::Frame;
pub use integration::{Detection, DetectionSource, SpeedPipeline, VehicleClasses};
pub use speed::{CrossingConfig, FrameReport, OverspeedEvent, SpeedLimit, SpeedTracker};
pub use tracker::{CentroidTracker, Rect, TrackerConfig};
