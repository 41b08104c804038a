//! Trait for object detection inference backends.

use std::collections::HashSet;

use crate::frame::Frame;
use crate::tracker::Rect;

/// A labelled box produced by a detector. Carries no identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
    /// Class name, e.g. `"car"`
    pub label: String,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, label: impl Into<String>) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
            label: label.into(),
        }
    }
}

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the speed pipeline.
///
/// # Example
///
/// ```ignore
/// use speedtrack_rs::{Detection, DetectionSource, Frame};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference on frame.image and return labelled boxes
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on a frame and return every detected object.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error>;
}

/// Set of class labels treated as vehicles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleClasses {
    labels: HashSet<String>,
}

impl VehicleClasses {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Boxes of the detections whose label is a vehicle class.
    pub fn filter_boxes(&self, detections: &[Detection]) -> Vec<Rect> {
        detections
            .iter()
            .filter(|d| self.contains(&d.label))
            .map(|d| d.bbox)
            .collect()
    }
}

impl Default for VehicleClasses {
    fn default() -> Self {
        Self::new(["car", "truck", "bus"])
    }
}
