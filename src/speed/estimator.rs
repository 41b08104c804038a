/// Converts line-to-line travel time into km/h.
#[derive(Debug, Clone, Copy)]
pub struct SpeedEstimator {
    distance_m: f64,
}

impl SpeedEstimator {
    pub fn new(distance_m: f64) -> Self {
        Self { distance_m }
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Speed in km/h rounded to one decimal, or `None` ("no speed") when the
    /// elapsed time is not a positive finite number.
    pub fn estimate(&self, elapsed_secs: f64) -> Option<f64> {
        if !(elapsed_secs > 0.0 && elapsed_secs.is_finite()) {
            return None;
        }
        let kmh = self.distance_m / elapsed_secs * 3.6;
        if !kmh.is_finite() {
            return None;
        }
        Some(round_to_tenth(kmh))
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_seconds_over_ten_meters() {
        let estimator = SpeedEstimator::new(10.0);
        assert_eq!(estimator.estimate(2.0), Some(18.0));
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        let estimator = SpeedEstimator::new(10.0);
        // 36 / 0.7 = 51.428...
        assert_eq!(estimator.estimate(0.7), Some(51.4));
        // 36 / 3 = 12
        assert_eq!(estimator.estimate(3.0), Some(12.0));
    }

    #[test]
    fn test_non_positive_elapsed_is_no_speed() {
        let estimator = SpeedEstimator::new(10.0);
        assert_eq!(estimator.estimate(0.0), None);
        assert_eq!(estimator.estimate(-1.5), None);
        assert_eq!(estimator.estimate(f64::NAN), None);
        assert_eq!(estimator.estimate(f64::INFINITY), None);
    }

    #[test]
    fn test_tiny_elapsed_stays_finite_or_none() {
        let estimator = SpeedEstimator::new(10.0);
        if let Some(speed) = estimator.estimate(f64::MIN_POSITIVE) {
            assert!(speed.is_finite() && speed > 0.0);
        }
    }
}
