//! Per-track speed cache and overspeed bookkeeping.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRecord {
    pub track_id: u64,
    /// `None` when the transit produced no usable speed.
    pub speed_kmh: Option<f64>,
}

#[derive(Debug, Default)]
pub struct SpeedBoard {
    speeds: HashMap<u64, SpeedRecord>,
    reported: HashSet<u64>,
}

impl SpeedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache the latest speed of `track_id`, replacing any earlier value.
    pub fn record(&mut self, track_id: u64, speed_kmh: Option<f64>) -> SpeedRecord {
        let record = SpeedRecord {
            track_id,
            speed_kmh,
        };
        self.speeds.insert(track_id, record);
        record
    }

    pub fn get(&self, track_id: u64) -> Option<&SpeedRecord> {
        self.speeds.get(&track_id)
    }

    /// Returns `true` only the first time `track_id` is marked.
    pub fn mark_reported(&mut self, track_id: u64) -> bool {
        self.reported.insert(track_id)
    }

    pub fn is_reported(&self, track_id: u64) -> bool {
        self.reported.contains(&track_id)
    }

    /// Drop everything about a retired identity.
    pub fn forget(&mut self, track_id: u64) {
        self.speeds.remove(&track_id);
        self.reported.remove(&track_id);
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }
}
