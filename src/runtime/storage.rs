//! Local-disk storage for overspeed reports.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::ReportError;

use super::reporter::{EncodedReport, OverspeedReporter};

pub const LOG_FILE_NAME: &str = "overspeeding_cars.jsonl";

/// One line of the overspeed log.
#[derive(Debug, Serialize)]
struct OverspeedEntry<'a> {
    image_path: &'a str,
    speed: f64,
    track_id: u64,
    date: String,
    time: String,
}

/// Writes each crop as a JPEG into a directory and appends an entry to
/// `overspeeding_cars.jsonl` next to it.
pub struct DirectoryReporter {
    dir: PathBuf,
    log: Mutex<File>,
}

impl DirectoryReporter {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE_NAME))?;
        Ok(Self {
            dir,
            log: Mutex::new(log),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn image_name(report: &EncodedReport) -> String {
        format!(
            "{}-{:.1}-{}.jpeg",
            report.captured_at.format("%d-%m-%Y-%H-%M-%S"),
            report.speed_kmh,
            report.track_id
        )
    }
}

impl OverspeedReporter for DirectoryReporter {
    fn report(&self, report: &EncodedReport) -> Result<String, ReportError> {
        let path = self.dir.join(Self::image_name(report));
        fs::write(&path, &report.jpeg)?;

        let image_path = path.to_string_lossy();
        let entry = OverspeedEntry {
            image_path: &image_path,
            speed: report.speed_kmh,
            track_id: report.track_id,
            date: report.captured_at.format("%d/%m/%Y").to_string(),
            time: report.captured_at.format("%H:%M:%S").to_string(),
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        self.log.lock().write_all(&line)?;

        Ok(image_path.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "speedtrack-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_writes_image_and_log_entry() {
        let dir = scratch_dir("storage");
        let reporter = DirectoryReporter::open(&dir).unwrap();
        let captured_at = Local.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();

        let stored = reporter
            .report(&EncodedReport {
                track_id: 12,
                speed_kmh: 64.8,
                captured_at,
                jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
            })
            .unwrap();

        assert!(stored.ends_with("07-03-2025-14-05-09-64.8-12.jpeg"));
        assert_eq!(fs::read(&stored).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);

        let log = fs::read_to_string(dir.join(LOG_FILE_NAME)).unwrap();
        let entry: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
        assert_eq!(entry["speed"], 64.8);
        assert_eq!(entry["track_id"], 12);
        assert_eq!(entry["date"], "07/03/2025");
        assert_eq!(entry["time"], "14:05:09");
        assert_eq!(entry["image_path"], stored.as_str());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_whole_speed_keeps_one_decimal_in_name() {
        let dir = scratch_dir("whole-speed");
        let reporter = DirectoryReporter::open(&dir).unwrap();
        let captured_at = Local.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();

        let stored = reporter
            .report(&EncodedReport {
                track_id: 3,
                speed_kmh: 72.0,
                captured_at,
                jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
            })
            .unwrap();

        assert!(stored.ends_with("07-03-2025-14-05-09-72.0-3.jpeg"));
        let _ = fs::remove_dir_all(&dir);
    }
}
