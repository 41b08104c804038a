use parking_lot::Mutex;

use crate::error::ConfigError;
use crate::speed::SpeedLimit;

/// Thread-safe holder of the current speed limit. Readers copy a snapshot.
#[derive(Debug, Default)]
pub struct SpeedLimitCell {
    value: Mutex<SpeedLimit>,
}

impl SpeedLimitCell {
    pub fn new(initial: SpeedLimit) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }

    pub fn get(&self) -> SpeedLimit {
        *self.value.lock()
    }

    /// Replace the limit, returning the previous one.
    pub fn set(&self, limit: SpeedLimit) -> SpeedLimit {
        std::mem::replace(&mut *self.value.lock(), limit)
    }

    /// Validate a raw km/h value before it reaches the cell. Invalid values
    /// leave the current limit untouched.
    pub fn set_kmh(&self, kmh: i64) -> Result<SpeedLimit, ConfigError> {
        let limit = SpeedLimit::new(kmh)?;
        Ok(self.set(limit))
    }
}
