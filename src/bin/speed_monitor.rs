use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use image::RgbImage;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use speedtrack_rs::annotate::Annotator;
use speedtrack_rs::integration::{ReplayDetector, ReplayRecord, SpeedPipeline, read_replay};
use speedtrack_rs::runtime::{
    AnnotatedFrameSink, DirectoryReporter, FileSpeedLimitSource, LatestFrame, ReporterPool,
    SpeedLimitCell, SpeedMonitor, spawn_speed_limit_poller,
};
use speedtrack_rs::{AppConfig, Frame, FrameReport};

/// Replay recorded detections through the speed pipeline.
#[derive(Parser, Debug)]
#[command(
    name = "speed-monitor",
    about = "Vehicle speed measurement between two reference lines"
)]
struct Args {
    /// YAML configuration; defaults apply when the file is missing
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// JSON-lines file of per-frame detections
    #[arg(long)]
    replay: PathBuf,
    /// JSON file holding {"max_speed": n}, re-read periodically
    #[arg(long)]
    limit_file: Option<PathBuf>,
    /// Write annotated frames as PNG into this directory
    #[arg(long)]
    annotated_dir: Option<PathBuf>,
    /// Publish frames at their recorded pace, letting the monitor drop frames
    /// it cannot keep up with. By default each frame waits to be consumed.
    #[arg(long)]
    realtime: bool,
}

struct PngSink {
    dir: PathBuf,
}

impl AnnotatedFrameSink for PngSink {
    fn publish(&mut self, frame: &Frame, annotated: &RgbImage, _report: &FrameReport) {
        let path = self.dir.join(format!("{:06}.png", frame.sequence));
        if let Err(e) = annotated.save(&path) {
            warn!(path = %path.display(), "failed to write annotated frame: {e}");
        }
    }
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path).with_context(|| format!("loading {}", path.display()))
    } else {
        warn!(path = %path.display(), "config file not found, using defaults");
        Ok(AppConfig::default())
    }
}

fn load_frame(record: &ReplayRecord, base: &Path, config: &AppConfig) -> Option<Frame> {
    let blank = || RgbImage::new(config.frame.width, config.frame.height);
    let Some(image) = &record.image else {
        return Some(Frame::with_timestamp(record.sequence, record.timestamp, blank()));
    };

    let path = base.join(image);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), "skipping frame {}: {e}", record.sequence);
            return None;
        }
    };
    match Frame::from_encoded(record.sequence, &bytes) {
        Ok(frame) => Some(Frame::with_timestamp(record.sequence, record.timestamp, frame.image)),
        Err(e) => {
            warn!("skipping frame: {e}");
            None
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("speedtrack_rs=info,speed_monitor=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;
    info!(
        line_first = config.lines.line_first,
        line_second = config.lines.line_second,
        offset = config.lines.offset,
        distance_m = config.lines.distance_m,
        "configuration loaded"
    );

    let replay_file = File::open(&args.replay)
        .with_context(|| format!("opening replay {}", args.replay.display()))?;
    let records = read_replay(BufReader::new(replay_file))?;
    info!(frames = records.len(), "replay loaded");

    let limit = Arc::new(SpeedLimitCell::new(config.initial_speed_limit()?));
    let frames = Arc::new(LatestFrame::new());

    let output_dir = &config.reporter.output_dir;
    let reporter = DirectoryReporter::open(output_dir)
        .with_context(|| format!("opening report directory {}", output_dir.display()))?;
    let pool = ReporterPool::spawn(
        Arc::new(reporter),
        config.reporter.workers,
        config.reporter.queue_capacity,
    );
    let queue = pool.queue().context("report queue closed")?;

    let (stop_poller, stop_rx) = crossbeam_channel::bounded::<()>(1);
    let poller = match &args.limit_file {
        Some(path) => Some(spawn_speed_limit_poller(
            FileSpeedLimitSource::new(path),
            Arc::clone(&limit),
            config.poll_interval(),
            stop_rx,
        )?),
        None => None,
    };

    let pipeline = SpeedPipeline::new(
        ReplayDetector::new(&records),
        config.vehicle_classes(),
        config.tracker.clone(),
        config.lines.clone(),
    );
    let mut monitor = SpeedMonitor::new(
        pipeline,
        Arc::clone(&frames),
        Arc::clone(&limit),
        queue,
        (config.frame.width, config.frame.height),
    );
    if let Some(dir) = &args.annotated_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let mut annotator = Annotator::new(config.lines.clone());
        if let Some(font) = &config.annotate.font {
            annotator = annotator.with_font_file(font)?;
        }
        monitor = monitor.with_annotations(annotator, Box::new(PngSink { dir: dir.clone() }));
    }

    let ingest = {
        let frames = Arc::clone(&frames);
        let base = args
            .replay
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let realtime = args.realtime;
        let config = config.clone();
        thread::Builder::new()
            .name("replay-ingest".into())
            .spawn(move || {
                let mut previous: Option<f64> = None;
                for record in &records {
                    if realtime {
                        if let Some(prev) = previous {
                            let gap = (record.timestamp - prev).max(0.0);
                            thread::sleep(Duration::from_secs_f64(gap));
                        }
                        previous = Some(record.timestamp);
                    }
                    if let Some(frame) = load_frame(record, &base, &config) {
                        frames.publish(frame);
                    }
                    if !realtime {
                        frames.wait_consumed();
                    }
                }
                frames.close();
            })?
    };

    let stats = monitor.run();
    if ingest.join().is_err() {
        error!("replay ingestion panicked");
    }

    drop(stop_poller);
    if let Some(handle) = poller {
        if handle.join().is_err() {
            error!("speed limit poller panicked");
        }
    }

    drop(monitor);
    pool.shutdown();

    info!(
        frames = stats.frames,
        failed = stats.failed_frames,
        overspeed = stats.overspeed_events,
        queued = stats.reports_queued,
        dropped = stats.reports_dropped,
        "done"
    );
    Ok(())
}
