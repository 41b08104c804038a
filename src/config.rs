//! YAML configuration for the speed monitor.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::integration::VehicleClasses;
use crate::speed::{CrossingConfig, SpeedLimit};
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1020,
            height: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeedLimitConfig {
    pub initial_kmh: i64,
    pub poll_interval_secs: u64,
}

impl Default for SpeedLimitConfig {
    fn default() -> Self {
        Self {
            initial_kmh: 20,
            poll_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub output_dir: PathBuf,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 16,
            output_dir: PathBuf::from("overspeeding_cars"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// TTF/OTF font used for labels. Without one only shapes are drawn.
    pub font: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub lines: CrossingConfig,
    pub tracker: TrackerConfig,
    pub frame: FrameConfig,
    pub speed_limit: SpeedLimitConfig,
    pub vehicle_classes: Vec<String>,
    pub reporter: ReporterConfig,
    pub annotate: AnnotateConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lines: CrossingConfig::default(),
            tracker: TrackerConfig::default(),
            frame: FrameConfig::default(),
            speed_limit: SpeedLimitConfig::default(),
            vehicle_classes: vec!["car".into(), "truck".into(), "bus".into()],
            reporter: ReporterConfig::default(),
            annotate: AnnotateConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lines.validate()?;
        SpeedLimit::new(self.speed_limit.initial_kmh)?;

        let match_distance = self.tracker.match_distance;
        if !(match_distance > 0.0 && match_distance.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "tracker.match_distance",
                reason: format!("must be positive and finite, got {match_distance}"),
            });
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(ConfigError::Invalid {
                field: "frame",
                reason: format!("{}x{} is empty", self.frame.width, self.frame.height),
            });
        }
        let top = self.lines.line_first.max(self.lines.line_second) + self.lines.offset;
        let bottom = self.lines.line_first.min(self.lines.line_second) - self.lines.offset;
        if bottom < 0.0 || top > self.frame.height as f32 {
            return Err(ConfigError::InvalidLines(format!(
                "bands must lie inside a frame of height {}",
                self.frame.height
            )));
        }
        if self.vehicle_classes.is_empty() {
            return Err(ConfigError::Invalid {
                field: "vehicle_classes",
                reason: "at least one class is required".into(),
            });
        }
        if self.speed_limit.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "speed_limit.poll_interval_secs",
                reason: "must be at least one second".into(),
            });
        }
        Ok(())
    }

    pub fn initial_speed_limit(&self) -> Result<SpeedLimit, ConfigError> {
        SpeedLimit::new(self.speed_limit.initial_kmh)
    }

    pub fn vehicle_classes(&self) -> VehicleClasses {
        VehicleClasses::new(self.vehicle_classes.iter().cloned())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.speed_limit.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.initial_speed_limit().unwrap().kmh(), 20);
        assert!(config.vehicle_classes().contains("bus"));
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
lines:
  line_first: 200
  line_second: 300
  distance_m: 15.5
tracker:
  max_misses: 10
speed_limit:
  initial_kmh: 80
vehicle_classes: [car, motorcycle]
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.lines.line_first, 200.0);
        assert_eq!(config.lines.offset, 6.0);
        assert_eq!(config.lines.distance_m, 15.5);
        assert_eq!(config.tracker.max_misses, 10);
        assert_eq!(config.tracker.match_distance, 35.0);
        assert_eq!(config.initial_speed_limit().unwrap().kmh(), 80);
        assert!(config.vehicle_classes().contains("motorcycle"));
        assert!(!config.vehicle_classes().contains("truck"));
    }

    #[test]
    fn test_rejects_out_of_range_limit() {
        let err = AppConfig::from_yaml("speed_limit:\n  initial_kmh: 300\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SpeedLimitOutOfRange { value: 300, .. }
        ));
    }

    #[test]
    fn test_rejects_lines_outside_frame() {
        let yaml = "frame:\n  width: 640\n  height: 360\n";
        assert!(matches!(
            AppConfig::from_yaml(yaml),
            Err(ConfigError::InvalidLines(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(matches!(
            AppConfig::from_yaml("lines:\n  line_first: .nan\n"),
            Err(ConfigError::InvalidLines(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml("lines:\n  offset: .inf\n"),
            Err(ConfigError::InvalidLines(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml("tracker:\n  match_distance: .inf\n"),
            Err(ConfigError::Invalid {
                field: "tracker.match_distance",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bad_yaml() {
        assert!(matches!(
            AppConfig::from_yaml("lines: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
