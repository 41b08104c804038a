//! Periodic refresh of the speed limit from an external source.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::speed::SpeedLimit;

use super::limit_cell::SpeedLimitCell;

/// Something that knows the currently posted speed limit in km/h.
pub trait SpeedLimitSource: Send {
    fn fetch(&mut self) -> Result<i64, SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Updated { from: SpeedLimit, to: SpeedLimit },
    Unchanged,
    Rejected(i64),
    Failed,
}

/// Fetch once and apply the value if it is valid and different.
pub fn poll_once<S: SpeedLimitSource + ?Sized>(
    source: &mut S,
    cell: &SpeedLimitCell,
) -> PollOutcome {
    let kmh = match source.fetch() {
        Ok(kmh) => kmh,
        Err(e) => {
            warn!("failed to fetch speed limit: {e}");
            return PollOutcome::Failed;
        }
    };

    let limit = match SpeedLimit::new(kmh) {
        Ok(limit) => limit,
        Err(e) => {
            warn!("ignoring speed limit: {e}");
            return PollOutcome::Rejected(kmh);
        }
    };

    if cell.get() == limit {
        debug!(limit = limit.kmh(), "speed limit unchanged");
        return PollOutcome::Unchanged;
    }

    let from = cell.set(limit);
    info!(from = from.kmh(), to = limit.kmh(), "speed limit updated");
    PollOutcome::Updated { from, to: limit }
}

/// Poll `source` every `interval` on a background thread until `stop` is
/// signalled or its sender is dropped.
pub fn spawn_speed_limit_poller<S>(
    mut source: S,
    cell: Arc<SpeedLimitCell>,
    interval: Duration,
    stop: Receiver<()>,
) -> std::io::Result<JoinHandle<()>>
where
    S: SpeedLimitSource + 'static,
{
    thread::Builder::new()
        .name("speed-limit-poller".into())
        .spawn(move || {
            loop {
                poll_once(&mut source, &cell);
                match stop.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("speed limit poller stopped");
        })
}

#[derive(Debug, Deserialize)]
struct LimitPayload {
    max_speed: i64,
}

/// Reads `{"max_speed": <km/h>}` from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileSpeedLimitSource {
    path: PathBuf,
}

impl FileSpeedLimitSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SpeedLimitSource for FileSpeedLimitSource {
    fn fetch(&mut self) -> Result<i64, SourceError> {
        let text = fs::read_to_string(&self.path)?;
        let payload: LimitPayload = serde_json::from_str(&text)?;
        Ok(payload.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::collections::VecDeque;

    struct ScriptedSource {
        values: VecDeque<Result<i64, SourceError>>,
    }

    impl SpeedLimitSource for ScriptedSource {
        fn fetch(&mut self) -> Result<i64, SourceError> {
            self.values
                .pop_front()
                .unwrap_or_else(|| Err(SourceError::Unavailable("script exhausted".into())))
        }
    }

    fn limit(kmh: i64) -> SpeedLimit {
        SpeedLimit::new(kmh).unwrap()
    }

    #[test]
    fn test_poll_once_outcomes() {
        let cell = SpeedLimitCell::new(limit(20));
        let mut source = ScriptedSource {
            values: VecDeque::from(vec![
                Ok(60),
                Ok(60),
                Ok(500),
                Err(SourceError::Unavailable("timeout".into())),
            ]),
        };

        assert_eq!(
            poll_once(&mut source, &cell),
            PollOutcome::Updated {
                from: limit(20),
                to: limit(60),
            }
        );
        assert_eq!(poll_once(&mut source, &cell), PollOutcome::Unchanged);
        assert_eq!(poll_once(&mut source, &cell), PollOutcome::Rejected(500));
        assert_eq!(poll_once(&mut source, &cell), PollOutcome::Failed);
        assert_eq!(cell.get(), limit(60));
    }

    #[test]
    fn test_poller_thread_applies_and_stops() {
        let cell = Arc::new(SpeedLimitCell::new(limit(20)));
        let source = ScriptedSource {
            values: VecDeque::from(vec![Ok(90)]),
        };
        let (stop_tx, stop_rx) = bounded(1);
        let handle =
            spawn_speed_limit_poller(source, Arc::clone(&cell), Duration::from_secs(60), stop_rx)
                .unwrap();

        // First poll happens immediately; wait for it to land.
        for _ in 0..200 {
            if cell.get() == limit(90) {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(cell.get(), limit(90));

        stop_tx.send(()).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_file_source() {
        let name = format!("speedtrack-limit-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, r#"{"max_speed": 45}"#).unwrap();
        let mut source = FileSpeedLimitSource::new(&path);
        assert_eq!(source.fetch().unwrap(), 45);

        fs::write(&path, "garbage").unwrap();
        assert!(matches!(source.fetch(), Err(SourceError::Parse(_))));

        let _ = fs::remove_file(&path);
        assert!(matches!(source.fetch(), Err(SourceError::Io(_))));
    }
}
