//! Matching utilities for centroid association.

use nalgebra::{Point2, distance};
use ndarray::Array2;

/// Compute the Euclidean distance matrix between track centroids (rows) and
/// detection centroids (columns).
pub fn centroid_distance(tracks: &[Point2<f32>], detections: &[Point2<f32>]) -> Array2<f32> {
    let mut dists = Array2::zeros((tracks.len(), detections.len()));
    for (i, t) in tracks.iter().enumerate() {
        for (j, d) in detections.iter().enumerate() {
            dists[[i, j]] = distance(t, d);
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(track_row, detection_col)` pairs, in detection order
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Greedy nearest-neighbour assignment.
///
/// Detections are visited in column order. Each one takes the closest track
/// whose cost is strictly below `thresh` and that no earlier detection has
/// already claimed. Ties go to the lower row index.
pub fn greedy_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    let mut claimed = vec![false; num_rows];
    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();

    for col in 0..num_cols {
        let mut best: Option<(usize, f32)> = None;
        for row in 0..num_rows {
            if claimed[row] {
                continue;
            }
            let cost = cost_matrix[[row, col]];
            if !(cost < thresh) {
                continue;
            }
            if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                best = Some((row, cost));
            }
        }

        match best {
            Some((row, _)) => {
                claimed[row] = true;
                matches.push((row, col));
            }
            None => unmatched_detections.push(col),
        }
    }

    let unmatched_tracks = claimed
        .iter()
        .enumerate()
        .filter(|(_, c)| !**c)
        .map(|(i, _)| i)
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
