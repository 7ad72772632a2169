//! Converting remaining distance into minutes.

use crate::config::EtaConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EtaEstimator {
    config: EtaConfig,
}

impl EtaEstimator {
    pub fn new(config: EtaConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &EtaConfig {
        &self.config
    }

    /// Speed used for the estimate: the observation if it is usable,
    /// otherwise the configured fallback
    pub fn effective_speed_kmh(&self, observed_kmh: Option<f64>) -> f64 {
        match observed_kmh {
            Some(speed) if speed.is_finite() && speed >= self.config.min_valid_speed_kmh => speed,
            _ => self.config.fallback_speed_kmh,
        }
    }

    /// Whole minutes to cover `remaining_km`, rounded to the nearest minute.
    ///
    /// Any distance left to travel is at least one minute; only a vehicle
    /// with nothing left to cover reports zero.
    pub fn estimate(&self, remaining_km: f64, observed_kmh: Option<f64>) -> u32 {
        if !remaining_km.is_finite() || remaining_km <= 0.0 {
            return 0;
        }

        let minutes = remaining_km / self.effective_speed_kmh(observed_kmh) * 60.0;
        (minutes.round() as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_is_zero_minutes() {
        let eta = EtaEstimator::default();
        assert_eq!(eta.estimate(0.0, Some(40.0)), 0);
        assert_eq!(eta.estimate(0.0, Some(0.0)), 0);
        assert_eq!(eta.estimate(0.0, None), 0);
    }

    #[test]
    fn test_stationary_uses_fallback() {
        let eta = EtaEstimator::default();
        assert_eq!(eta.estimate(25.0, Some(0.0)), 60);
        assert_eq!(eta.estimate(25.0, None), 60);
    }

    #[test]
    fn test_speed_below_floor_uses_fallback() {
        let eta = EtaEstimator::default();
        assert_eq!(eta.estimate(10.0, Some(3.0)), 24);
        assert_eq!(eta.effective_speed_kmh(Some(4.99)), 25.0);
    }

    #[test]
    fn test_observed_speed_used_at_or_above_floor() {
        let eta = EtaEstimator::default();
        assert_eq!(eta.effective_speed_kmh(Some(5.0)), 5.0);
        assert_eq!(eta.estimate(10.0, Some(60.0)), 10);
        assert_eq!(eta.estimate(1.0, Some(40.0)), 2); // 1.5 rounds up
    }

    #[test]
    fn test_short_hop_is_at_least_a_minute() {
        let eta = EtaEstimator::default();
        assert_eq!(eta.estimate(0.157, Some(0.0)), 1);
        assert_eq!(eta.estimate(0.001, Some(80.0)), 1);
    }

    #[test]
    fn test_never_negative_or_infinite() {
        let eta = EtaEstimator::default();
        assert_eq!(eta.estimate(-3.0, Some(30.0)), 0);
        assert_eq!(eta.estimate(f64::NAN, Some(30.0)), 0);
        assert_eq!(eta.estimate(5.0, Some(f64::NAN)), 12);
        assert_eq!(eta.estimate(5.0, Some(f64::INFINITY)), 12);
    }

    #[test]
    fn test_configured_thresholds() {
        let eta = EtaEstimator::new(EtaConfig {
            min_valid_speed_kmh: 2.0,
            fallback_speed_kmh: 12.0,
        });

        assert_eq!(eta.estimate(6.0, Some(3.0)), 120);
        assert_eq!(eta.estimate(6.0, Some(1.0)), 30);
    }
}
