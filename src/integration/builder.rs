//! Fluent construction of [`Detection`]s from the box layouts detectors emit.

use crate::tracker::Rect;

use super::Detection;

/// Collects a box, score and label. Unset scores default to 1.0 and unset
/// labels to `"car"`, which is what recorded replays without metadata mean.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    bbox: Rect,
    score: f32,
    label: String,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            bbox: Rect::default(),
            score: 1.0,
            label: "car".to_string(),
        }
    }
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Corners: (x1, y1) top-left, (x2, y2) bottom-right.
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Center point plus size, as YOLO-style heads report boxes.
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(cx - w / 2.0, cy - h / 2.0, w, h);
        self
    }

    /// Left, top, width, height.
    pub fn tlwh(mut self, left: f32, top: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(left, top, w, h);
        self
    }

    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn build(self) -> Detection {
        Detection {
            bbox: self.bbox,
            score: self.score,
            label: self.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tlbr_detection() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .score(0.95)
            .label("truck")
            .build();

        assert_eq!(det.score, 0.95);
        assert_eq!(det.label, "truck");
        assert_eq!(det.bbox, Rect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_defaults_describe_a_certain_car() {
        let det = DetectionBuilder::new().tlwh(0.0, 0.0, 4.0, 4.0).build();
        assert_eq!(det.score, 1.0);
        assert_eq!(det.label, "car");
    }

    #[test]
    fn test_xywh_and_tlwh_agree() {
        let a = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build();
        let b = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build();
        assert_eq!(a.bbox, b.bbox);
        assert_eq!(a.bbox.center(), (30.0, 50.0));
    }
}
