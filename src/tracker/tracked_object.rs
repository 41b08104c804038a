//! A single vehicle identity maintained across frames.

use nalgebra::Point2;

use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

#[derive(Debug, Clone)]
pub struct TrackedObject {
    /// Unique track identifier
    pub track_id: u64,
    /// Centroid of the last matched box
    pub centroid: Point2<f32>,
    /// Last matched box
    pub bbox: Rect,
    /// Consecutive frames without a match
    pub misses: u32,
    /// Current track state
    pub state: TrackState,
    /// Frame ID when track was started
    pub start_frame: u32,
    /// Frame ID of the last match
    pub frame_id: u32,
}

impl TrackedObject {
    pub fn new(track_id: u64, bbox: Rect, frame_id: u32) -> Self {
        Self {
            track_id,
            centroid: bbox.centroid(),
            bbox,
            misses: 0,
            state: TrackState::New,
            start_frame: frame_id,
            frame_id,
        }
    }

    pub fn update(&mut self, bbox: Rect, frame_id: u32) {
        self.centroid = bbox.centroid();
        self.bbox = bbox;
        self.misses = 0;
        self.state = TrackState::Tracked;
        self.frame_id = frame_id;
    }

    pub fn mark_missed(&mut self) {
        self.misses += 1;
        self.state = TrackState::Lost;
    }

    pub fn mark_removed(&mut self) {
        self.state = TrackState::Removed;
    }

    pub fn is_retired(&self, max_misses: u32) -> bool {
        self.misses >= max_misses
    }

    /// Number of frames between the first and the last match.
    pub fn age(&self) -> u32 {
        self.frame_id - self.start_frame
    }
}
