//! Integration module for connecting object detection backends with the
//! speed pipeline.
//!
//! This module provides traits and utilities for integrating various inference
//! backends (Burn, recorded replays, etc.) with the tracker.

mod builder;
mod detector;
mod pipeline;
mod replay;

pub use builder::DetectionBuilder;
pub use detector::{Detection, DetectionSource, VehicleClasses};
pub use pipeline::SpeedPipeline;
pub use replay::{ReplayBox, ReplayDetector, ReplayRecord, read_replay};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnDetector, BurnDetectorError, BurnModel, RawDetection};
