mod centroid_tracker;
pub mod matching;
mod rect;
mod track_state;
mod tracked_object;

pub use centroid_tracker::{CentroidTracker, TrackUpdate, TrackedBox, TrackerConfig};
pub use rect::{PixelRegion, Rect};
pub use track_state::TrackState;
pub use tracked_object::TrackedObject;
