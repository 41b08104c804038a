use std::fmt;

use crate::error::ConfigError;

/// A speed limit in km/h that is known to lie in
/// [`SpeedLimit::MIN_KMH`, `SpeedLimit::MAX_KMH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeedLimit(u32);

impl SpeedLimit {
    pub const MIN_KMH: u32 = 10;
    pub const MAX_KMH: u32 = 220;

    pub fn new(kmh: i64) -> Result<Self, ConfigError> {
        if kmh < Self::MIN_KMH as i64 || kmh > Self::MAX_KMH as i64 {
            return Err(ConfigError::SpeedLimitOutOfRange {
                value: kmh,
                min: Self::MIN_KMH,
                max: Self::MAX_KMH,
            });
        }
        Ok(Self(kmh as u32))
    }

    pub fn kmh(self) -> u32 {
        self.0
    }

    /// Strictly greater than the limit.
    pub fn is_exceeded_by(self, speed_kmh: f64) -> bool {
        speed_kmh > self.0 as f64
    }
}

impl Default for SpeedLimit {
    fn default() -> Self {
        Self(20)
    }
}

impl fmt::Display for SpeedLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km/h", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        assert_eq!(SpeedLimit::new(10).unwrap().kmh(), 10);
        assert_eq!(SpeedLimit::new(220).unwrap().kmh(), 220);
        assert!(matches!(
            SpeedLimit::new(9),
            Err(ConfigError::SpeedLimitOutOfRange { value: 9, .. })
        ));
        assert!(SpeedLimit::new(221).is_err());
        assert!(SpeedLimit::new(-50).is_err());
    }

    #[test]
    fn test_exceeded_is_strict() {
        let limit = SpeedLimit::new(60).unwrap();
        assert!(!limit.is_exceeded_by(60.0));
        assert!(limit.is_exceeded_by(60.1));
        assert!(!limit.is_exceeded_by(f64::NAN));
    }

    #[test]
    fn test_default_is_valid() {
        let limit = SpeedLimit::default();
        assert_eq!(SpeedLimit::new(limit.kmh() as i64).unwrap(), limit);
        assert_eq!(limit.to_string(), "20 km/h");
    }
}
