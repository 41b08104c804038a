//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("speed limit {value} km/h is outside the allowed range [{min}, {max}]")]
    SpeedLimitOutOfRange { value: i64, min: u32, max: u32 },
    #[error("invalid reference lines: {0}")]
    InvalidLines(String),
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid font file {0}")]
    Font(PathBuf),
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to decode frame {sequence}: {source}")]
    Decode {
        sequence: u64,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cropped region of track {0} is empty")]
    EmptyRegion(u64),
    #[error("failed to encode crop: {0}")]
    Encode(#[from] image::ImageError),
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("report rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read speed limit source: {0}")]
    Io(#[from] io::Error),
    #[error("malformed speed limit payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("speed limit source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
