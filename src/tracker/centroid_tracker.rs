//! Greedy nearest-centroid identity tracker.

use nalgebra::Point2;
use serde::Deserialize;
use tracing::debug;

use crate::tracker::matching::{self, AssignmentResult};
use crate::tracker::rect::Rect;
use crate::tracker::tracked_object::TrackedObject;
use crate::tracker::track_state::TrackState;

/// Configuration for the CentroidTracker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum centroid displacement in pixels between consecutive matches.
    pub match_distance: f32,
    /// Consecutive missed frames after which an identity is retired.
    pub max_misses: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_distance: 35.0,
            max_misses: 5,
        }
    }
}

/// A box from the current frame together with the identity assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedBox {
    pub track_id: u64,
    pub bbox: Rect,
    pub centroid: Point2<f32>,
    /// `true` when the identity was created for this box.
    pub is_new: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TrackUpdate {
    /// One entry per input box, in input order.
    pub assignments: Vec<TrackedBox>,
    /// Identities retired this frame.
    pub retired: Vec<u64>,
}

pub struct CentroidTracker {
    tracks: Vec<TrackedObject>,
    next_id: u64,
    frame_id: u32,
    config: TrackerConfig,
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            frame_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Live (not yet retired) tracks, oldest identity first.
    pub fn tracks(&self) -> &[TrackedObject] {
        &self.tracks
    }

    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    pub fn update(&mut self, boxes: &[Rect]) -> TrackUpdate {
        self.frame_id += 1;

        // Step 1: Associate incoming centroids with live tracks
        let track_points: Vec<Point2<f32>> = self.tracks.iter().map(|t| t.centroid).collect();
        let det_points: Vec<Point2<f32>> = boxes.iter().map(Rect::centroid).collect();
        let dists = matching::centroid_distance(&track_points, &det_points);

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::greedy_assignment(&dists, self.config.match_distance);

        let mut assigned: Vec<Option<TrackedBox>> = vec![None; boxes.len()];

        for (itrack, idet) in matches {
            let track = &mut self.tracks[itrack];
            track.update(boxes[idet], self.frame_id);
            assigned[idet] = Some(TrackedBox {
                track_id: track.track_id,
                bbox: boxes[idet],
                centroid: track.centroid,
                is_new: false,
            });
        }

        // Step 2: Count misses on tracks nothing matched
        for idx in unmatched_tracks {
            self.tracks[idx].mark_missed();
        }

        // Step 3: Retire tracks that missed too many frames
        let mut retired = Vec::new();
        let max_misses = self.config.max_misses;
        self.tracks.retain_mut(|track| {
            if track.state == TrackState::Lost && track.is_retired(max_misses) {
                track.mark_removed();
                debug!(
                    track_id = track.track_id,
                    misses = track.misses,
                    age = track.age(),
                    "retiring track"
                );
                retired.push(track.track_id);
                false
            } else {
                true
            }
        });

        // Step 4: Init new tracks
        for idx in unmatched_detections {
            let track_id = self.next_id;
            self.next_id += 1;

            let track = TrackedObject::new(track_id, boxes[idx], self.frame_id);
            debug!(
                track_id,
                cx = track.centroid.x,
                cy = track.centroid.y,
                "new track"
            );
            assigned[idx] = Some(TrackedBox {
                track_id,
                bbox: boxes[idx],
                centroid: track.centroid,
                is_new: true,
            });
            self.tracks.push(track);
        }

        TrackUpdate {
            assignments: assigned.into_iter().flatten().collect(),
            retired,
        }
    }
}
