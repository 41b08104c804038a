//! Single-slot latest-wins frame hand-off between ingestion and processing.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::frame::Frame;

#[derive(Default)]
struct Slot {
    frame: Option<Frame>,
    closed: bool,
    dropped: u64,
}

/// Each `publish` replaces whatever is still unread; the consumer always gets
/// the newest frame and never sees a backlog.
#[derive(Default)]
pub struct LatestFrame {
    slot: Mutex<Slot>,
    ready: Condvar,
    consumed: Condvar,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame` as the latest one. Returns `true` when an unread frame
    /// was overwritten. Frames published after `close` are discarded.
    pub fn publish(&self, frame: Frame) -> bool {
        let mut slot = self.slot.lock();
        if slot.closed {
            return false;
        }
        let replaced = slot.frame.replace(frame).is_some();
        if replaced {
            slot.dropped += 1;
        }
        drop(slot);
        self.ready.notify_one();
        replaced
    }

    /// Take the latest frame without waiting.
    pub fn take(&self) -> Option<Frame> {
        let frame = self.slot.lock().frame.take();
        if frame.is_some() {
            self.consumed.notify_all();
        }
        frame
    }

    /// Block until a frame is available. Returns `None` once the mailbox is
    /// closed and drained.
    pub fn wait_latest(&self) -> Option<Frame> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(frame) = slot.frame.take() {
                drop(slot);
                self.consumed.notify_all();
                return Some(frame);
            }
            if slot.closed {
                return None;
            }
            self.ready.wait(&mut slot);
        }
    }

    /// Like [`LatestFrame::wait_latest`] but gives up after `timeout`.
    pub fn wait_latest_timeout(&self, timeout: Duration) -> Option<Frame> {
        let mut slot = self.slot.lock();
        if slot.frame.is_none() && !slot.closed {
            let _ = self.ready.wait_for(&mut slot, timeout);
        }
        let frame = slot.frame.take();
        drop(slot);
        if frame.is_some() {
            self.consumed.notify_all();
        }
        frame
    }

    /// Block until the consumer has taken the pending frame, or the mailbox
    /// is closed. Lets a producer hand over every frame without drops.
    pub fn wait_consumed(&self) {
        let mut slot = self.slot.lock();
        while slot.frame.is_some() && !slot.closed {
            self.consumed.wait(&mut slot);
        }
    }

    /// Stop accepting frames and wake any waiting consumer. A frame that is
    /// still unread can be taken afterwards.
    pub fn close(&self) {
        self.slot.lock().closed = true;
        self.ready.notify_all();
        self.consumed.notify_all();
    }

    /// Whether a published frame is still waiting for the consumer.
    pub fn has_unread(&self) -> bool {
        self.slot.lock().frame.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }

    /// Frames overwritten before the consumer picked them up.
    pub fn dropped(&self) -> u64 {
        self.slot.lock().dropped
    }
}
