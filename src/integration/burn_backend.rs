//! Burn inference backend for object detection.
//!
//! This module provides a `BurnDetector` that implements `DetectionSource`
//! for running object detection models built with the Burn framework.
//!
//! # Example
//!
//! ```ignore
//! use speedtrack_rs::integration::{BurnDetector, BurnModel, RawDetection};
//! use burn::backend::NdArray;
//!
//! // Implement BurnModel for your detection model
//! struct MyYoloModel { /* ... */ }
//!
//! impl BurnModel<NdArray> for MyYoloModel {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<RawDetection> {
//!         // Run inference
//!     }
//! }
//!
//! let model = MyYoloModel::load("model.bin");
//! let detector = BurnDetector::new(model, Default::default(), coco_class_names());
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use image::imageops;
use thiserror::Error;

use super::{Detection, DetectionBuilder, DetectionSource};
use crate::frame::Frame;

/// Error type for Burn detection failures.
#[derive(Debug, Clone, Error)]
pub enum BurnDetectorError {
    #[error("model expects {expected} input channels, frames have 3")]
    UnsupportedChannels { expected: u32 },
    #[error("inference error: {0}")]
    InferenceError(String),
}

/// Raw detection output from the model before NMS.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Bounding box: [x1, y1, x2, y2] or [cx, cy, w, h] depending on model
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Class ID
    pub class_id: Option<usize>,
}

/// Trait for Burn-based detection models.
///
/// Implement this trait for your specific model architecture.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on the input tensor of shape [batch, channels, height, width].
    fn forward(&self, input: Tensor<B, 4>) -> Vec<RawDetection>;

    /// Get the expected input size (channels, height, width).
    fn input_size(&self) -> (u32, u32, u32) {
        (3, 640, 640) // Default YOLO input size
    }

    /// Whether bbox output is in XYWH format (vs TLBR).
    fn bbox_is_xywh(&self) -> bool {
        true // Most YOLO variants use XYWH
    }
}

/// Burn-based object detector implementing `DetectionSource`.
pub struct BurnDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
    class_names: Vec<String>,
    conf_threshold: f32,
}

impl<B: Backend, M: BurnModel<B>> BurnDetector<B, M> {
    /// Create a new Burn detector. `class_names[i]` is the label of class id `i`.
    pub fn new(model: M, device: B::Device, class_names: Vec<String>) -> Self {
        Self {
            model,
            device,
            class_names,
            conf_threshold: 0.25,
        }
    }

    /// Set the confidence threshold for filtering detections.
    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    /// Resize the frame to the model input and lay it out as a normalized
    /// [1, C, H, W] tensor.
    pub fn preprocess(&self, frame: &Frame) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let (channels, target_h, target_w) = self.model.input_size();
        if channels != 3 {
            return Err(BurnDetectorError::UnsupportedChannels { expected: channels });
        }

        let resized = imageops::resize(
            &frame.image,
            target_w,
            target_h,
            imageops::FilterType::Triangle,
        );

        let plane = (target_w * target_h) as usize;
        let mut data = vec![0.0f32; plane * 3];
        for (i, pixel) in resized.pixels().enumerate() {
            for c in 0..3 {
                data[c * plane + i] = pixel.0[c] as f32 / 255.0;
            }
        }

        let input = Tensor::<B, 1>::from_floats(data.as_slice(), &self.device);
        Ok(input.reshape([1, 3, target_h as usize, target_w as usize]))
    }

    /// Convert raw model outputs to labelled detections in frame coordinates.
    fn postprocess(&self, raw_detections: Vec<RawDetection>, frame: &Frame) -> Vec<Detection> {
        let (_, input_h, input_w) = self.model.input_size();
        let sx = frame.width() as f32 / input_w as f32;
        let sy = frame.height() as f32 / input_h as f32;

        raw_detections
            .into_iter()
            .filter(|d| d.score >= self.conf_threshold)
            .filter_map(|d| {
                let label = self.class_names.get(d.class_id?)?.clone();
                let [a, b, c, e] = d.bbox;
                let builder = DetectionBuilder::new().score(d.score).label(label);
                let builder = if self.model.bbox_is_xywh() {
                    builder.xywh(a * sx, b * sy, c * sx, e * sy)
                } else {
                    builder.tlbr(a * sx, b * sy, c * sx, e * sy)
                };
                Some(builder.build())
            })
            .collect()
    }
}

impl<B: Backend, M: BurnModel<B>> DetectionSource for BurnDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
        let tensor = self.preprocess(frame)?;
        let raw_detections = self.model.forward(tensor);
        Ok(self.postprocess(raw_detections, frame))
    }
}
