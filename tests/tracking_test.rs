use speedtrack_rs::{CentroidTracker, Rect, TrackerConfig};

fn car(cx: f32, cy: f32) -> Rect {
    Rect::new(cx - 30.0, cy - 15.0, 60.0, 30.0)
}

fn tracker(max_misses: u32) -> CentroidTracker {
    CentroidTracker::new(TrackerConfig {
        match_distance: 35.0,
        max_misses,
    })
}

#[test]
fn test_basic_tracking() {
    let mut tracker = tracker(5);

    // Frame 1: One detection
    let update = tracker.update(&[car(500.0, 250.0)]);
    assert_eq!(update.assignments.len(), 1);
    let id1 = update.assignments[0].track_id;
    assert!(update.assignments[0].is_new);

    // Frames 2..20: Same object moving down by less than the threshold each frame
    for step in 1..20 {
        let update = tracker.update(&[car(500.0 + step as f32, 250.0 + 12.0 * step as f32)]);
        assert_eq!(update.assignments.len(), 1);
        assert_eq!(update.assignments[0].track_id, id1); // ID should persist
        assert!(!update.assignments[0].is_new);
    }
}

#[test]
fn test_brief_dropout_keeps_identity() {
    let mut tracker = tracker(3);
    let first = tracker.update(&[car(400.0, 300.0)]);
    let id = first.assignments[0].track_id;

    // Object disappears for fewer than max_misses frames
    for _ in 0..2 {
        let update = tracker.update(&[]);
        assert!(update.assignments.is_empty());
        assert!(update.retired.is_empty());
    }

    // Object reappears near its last known centroid
    let update = tracker.update(&[car(405.0, 320.0)]);
    assert_eq!(update.assignments[0].track_id, id);
    assert!(!update.assignments[0].is_new);
}

#[test]
fn test_long_dropout_creates_new_identity() {
    let mut tracker = tracker(3);
    let first = tracker.update(&[car(400.0, 300.0)]);
    let id = first.assignments[0].track_id;

    let mut retired = Vec::new();
    for _ in 0..3 {
        retired.extend(tracker.update(&[]).retired);
    }
    assert_eq!(retired, vec![id]);
    assert!(tracker.tracks().is_empty());

    // Same place, but the old identity is gone for good
    let update = tracker.update(&[car(400.0, 300.0)]);
    assert!(update.assignments[0].is_new);
    assert!(update.assignments[0].track_id > id);
}

#[test]
fn test_dropout_of_one_vehicle_among_others() {
    let mut tracker = tracker(2);
    let first = tracker.update(&[car(200.0, 100.0), car(700.0, 100.0)]);
    let (left, right) = (first.assignments[0].track_id, first.assignments[1].track_id);

    // The right vehicle is missed while the left one keeps moving
    tracker.update(&[car(200.0, 120.0)]);
    let update = tracker.update(&[car(200.0, 140.0), car(700.0, 110.0)]);
    let ids: Vec<u64> = update.assignments.iter().map(|a| a.track_id).collect();
    assert_eq!(ids, vec![left, right]);
}

#[test]
fn test_far_jump_is_a_new_vehicle() {
    let mut tracker = tracker(5);
    let first = tracker.update(&[car(100.0, 100.0)]);
    let id = first.assignments[0].track_id;

    let update = tracker.update(&[car(100.0, 136.0)]);
    assert_ne!(update.assignments[0].track_id, id);
    assert_eq!(tracker.tracks().len(), 2);
}

#[test]
fn test_identities_are_never_reused() {
    let mut tracker = tracker(0);
    let mut seen = Vec::new();
    for round in 0..5 {
        let update = tracker.update(&[car(100.0 + 200.0 * round as f32, 100.0)]);
        seen.push(update.assignments[0].track_id);
        tracker.update(&[]);
    }
    let mut sorted = seen.clone();
    sorted.dedup();
    assert_eq!(sorted, seen);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}
