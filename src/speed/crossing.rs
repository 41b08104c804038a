//! Reference-line crossing detection.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Geometry of the two horizontal reference lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CrossingConfig {
    /// y-coordinate of the first line, in resized frame pixels
    pub line_first: f32,
    /// y-coordinate of the second line
    pub line_second: f32,
    /// Half-height of the band around each line
    pub offset: f32,
    /// Real-world distance between the lines, in meters
    pub distance_m: f64,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self {
            line_first: 322.0,
            line_second: 368.0,
            offset: 6.0,
            distance_m: 10.0,
        }
    }
}

impl CrossingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.line_first.is_finite() && self.line_second.is_finite()) {
            return Err(ConfigError::InvalidLines(format!(
                "line positions must be finite, got y={} and y={}",
                self.line_first, self.line_second
            )));
        }
        if !(self.offset > 0.0 && self.offset.is_finite()) {
            return Err(ConfigError::InvalidLines(format!(
                "offset must be positive, got {}",
                self.offset
            )));
        }
        if !(self.distance_m > 0.0 && self.distance_m.is_finite()) {
            return Err(ConfigError::InvalidLines(format!(
                "distance between lines must be positive, got {} m",
                self.distance_m
            )));
        }
        if (self.line_second - self.line_first).abs() < 2.0 * self.offset {
            return Err(ConfigError::InvalidLines(format!(
                "bands around y={} and y={} overlap with offset {}",
                self.line_first, self.line_second, self.offset
            )));
        }
        Ok(())
    }

    /// Whether `cy` lies strictly inside the band around `line`.
    pub fn in_band(&self, line: Line, cy: f32) -> bool {
        let y = match line {
            Line::First => self.line_first,
            Line::Second => self.line_second,
        };
        y - self.offset < cy && cy < y + self.offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingRecord {
    pub track_id: u64,
    pub line: Line,
    pub timestamp: f64,
}

/// A completed FIRST → SECOND passage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transit {
    pub first: CrossingRecord,
    pub second: CrossingRecord,
}

impl Transit {
    /// Seconds between the two crossings. May be zero or negative when the
    /// clock misbehaves.
    pub fn elapsed(&self) -> f64 {
        self.second.timestamp - self.first.timestamp
    }
}

pub struct CrossingDetector {
    config: CrossingConfig,
    first_crossings: HashMap<u64, f64>,
}

impl CrossingDetector {
    pub fn new(config: CrossingConfig) -> Self {
        Self {
            config,
            first_crossings: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CrossingConfig {
        &self.config
    }

    /// Feed the current centroid height of `track_id` observed at `now`.
    ///
    /// Entering the FIRST band (re)records the FIRST timestamp. Entering the
    /// SECOND band with a pending FIRST record consumes that record and
    /// returns the completed transit.
    pub fn observe(&mut self, track_id: u64, cy: f32, now: f64) -> Option<Transit> {
        if self.config.in_band(Line::First, cy) {
            debug!(track_id, cy, now, "first line crossed");
            self.first_crossings.insert(track_id, now);
        }

        if !self.config.in_band(Line::Second, cy) {
            return None;
        }

        let entered_at = self.first_crossings.remove(&track_id)?;
        debug!(track_id, cy, now, entered_at, "second line crossed");
        Some(Transit {
            first: CrossingRecord {
                track_id,
                line: Line::First,
                timestamp: entered_at,
            },
            second: CrossingRecord {
                track_id,
                line: Line::Second,
                timestamp: now,
            },
        })
    }

    /// The pending FIRST crossing of `track_id`, if any.
    pub fn pending(&self, track_id: u64) -> Option<CrossingRecord> {
        self.first_crossings
            .get(&track_id)
            .map(|&timestamp| CrossingRecord {
                track_id,
                line: Line::First,
                timestamp,
            })
    }

    pub fn pending_count(&self) -> usize {
        self.first_crossings.len()
    }

    pub fn forget(&mut self, track_id: u64) {
        self.first_crossings.remove(&track_id);
    }
}
