//! Video frames as they travel from ingestion to the processing loop.

use std::time::{SystemTime, UNIX_EPOCH};

use image::{RgbImage, imageops};

use crate::error::FrameError;

#[derive(Debug, Clone)]
pub struct Frame {
    /// Ingestion order, starting wherever the producer starts
    pub sequence: u64,
    /// Wall-clock capture time in seconds since the Unix epoch
    pub timestamp: f64,
    pub image: RgbImage,
}

impl Frame {
    /// Wrap an image, stamping it with the current wall-clock time.
    pub fn new(sequence: u64, image: RgbImage) -> Self {
        Self::with_timestamp(sequence, now_secs(), image)
    }

    pub fn with_timestamp(sequence: u64, timestamp: f64, image: RgbImage) -> Self {
        Self {
            sequence,
            timestamp,
            image,
        }
    }

    /// Decode an encoded image (JPEG, PNG, ...) into a frame stamped now.
    pub fn from_encoded(sequence: u64, bytes: &[u8]) -> Result<Self, FrameError> {
        let image = image::load_from_memory(bytes)
            .map_err(|source| FrameError::Decode { sequence, source })?
            .to_rgb8();
        Ok(Self::new(sequence, image))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Resize to `width` x `height`, keeping sequence and timestamp.
    pub fn resized(self, width: u32, height: u32) -> Self {
        if self.image.dimensions() == (width, height) {
            return self;
        }
        let image = imageops::resize(&self.image, width, height, imageops::FilterType::Triangle);
        Self { image, ..self }
    }
}

pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
