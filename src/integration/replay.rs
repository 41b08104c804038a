//! Recorded detections replayed as a `DetectionSource`.
//!
//! A replay file holds one JSON object per line:
//!
//! ```text
//! {"sequence": 0, "timestamp": 1700000000.0, "image": "frames/0000.jpg",
//!  "detections": [{"x1": 480, "y1": 300, "x2": 540, "y2": 330, "label": "car", "score": 0.91}]}
//! ```
//!
//! `image` is optional; without it the frame is blank.

use std::collections::HashMap;
use std::convert::Infallible;
use std::io::BufRead;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ReplayError;
use crate::frame::Frame;

use super::{Detection, DetectionBuilder, DetectionSource};

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub label: String,
    #[serde(default = "default_score")]
    pub score: f32,
}

fn default_score() -> f32 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayRecord {
    pub sequence: u64,
    pub timestamp: f64,
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub detections: Vec<ReplayBox>,
}

impl ReplayRecord {
    pub fn to_detections(&self) -> Vec<Detection> {
        self.detections
            .iter()
            .map(|b| {
                DetectionBuilder::new()
                    .tlbr(b.x1, b.y1, b.x2, b.y2)
                    .score(b.score)
                    .label(b.label.clone())
                    .build()
            })
            .collect()
    }
}

/// Parse a JSON-lines replay. Blank lines are skipped.
pub fn read_replay<R: BufRead>(reader: R) -> Result<Vec<ReplayRecord>, ReplayError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Hands out the recorded detections of each frame by sequence number.
/// Frames without a record have no detections.
#[derive(Debug, Default)]
pub struct ReplayDetector {
    by_sequence: HashMap<u64, Vec<Detection>>,
}

impl ReplayDetector {
    pub fn new(records: &[ReplayRecord]) -> Self {
        Self {
            by_sequence: records
                .iter()
                .map(|r| (r.sequence, r.to_detections()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sequence.is_empty()
    }
}

impl DetectionSource for ReplayDetector {
    type Error = Infallible;

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
        Ok(self
            .by_sequence
            .remove(&frame.sequence)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const REPLAY: &str = r#"
{"sequence": 0, "timestamp": 10.0, "detections": [{"x1": 480, "y1": 307, "x2": 540, "y2": 337, "label": "car", "score": 0.9}]}

{"sequence": 1, "timestamp": 10.5, "image": "frames/1.jpg", "detections": [{"x1": 480, "y1": 330, "x2": 540, "y2": 360, "label": "truck"}]}
{"sequence": 2, "timestamp": 11.0}
"#;

    #[test]
    fn test_read_replay() {
        let records = read_replay(REPLAY.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].image, Some(PathBuf::from("frames/1.jpg")));
        assert_eq!(records[1].detections[0].score, 1.0);
        assert!(records[2].detections.is_empty());
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let err = read_replay("{\"sequence\": 0, \"timestamp\": 1.0}\nnot json\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_detector_serves_by_sequence() {
        let records = read_replay(REPLAY.as_bytes()).unwrap();
        let mut detector = ReplayDetector::new(&records);
        assert_eq!(detector.len(), 3);

        let frame = Frame::with_timestamp(1, 10.5, RgbImage::new(4, 4));
        let dets = detector.detect(&frame).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "truck");
        assert_eq!(dets[0].bbox.center(), (510.0, 345.0));

        let unknown = Frame::with_timestamp(99, 12.0, RgbImage::new(4, 4));
        assert!(detector.detect(&unknown).unwrap().is_empty());
    }
}
