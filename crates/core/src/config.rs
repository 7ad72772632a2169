use std::time::Duration;

use serde::Deserialize;

/// Speed thresholds for turning remaining distance into minutes
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EtaConfig {
    /// Observed speeds below this are treated as stale (standing in traffic, GPS jitter)
    pub min_valid_speed_kmh: f64,
    /// Speed assumed when no usable observation exists
    pub fallback_speed_kmh: f64,
}

impl EtaConfig {
    pub const DEFAULT_MIN_VALID_SPEED_KMH: f64 = 5.0;
    pub const DEFAULT_FALLBACK_SPEED_KMH: f64 = 25.0;

    /// Replace unusable values with the defaults so the fallback divisor is always positive
    pub fn validated(self) -> Self {
        let usable = |v: f64| v.is_finite() && v > 0.0;

        Self {
            min_valid_speed_kmh: if usable(self.min_valid_speed_kmh) {
                self.min_valid_speed_kmh
            } else {
                Self::DEFAULT_MIN_VALID_SPEED_KMH
            },
            fallback_speed_kmh: if usable(self.fallback_speed_kmh) {
                self.fallback_speed_kmh
            } else {
                Self::DEFAULT_FALLBACK_SPEED_KMH
            },
        }
    }
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            min_valid_speed_kmh: Self::DEFAULT_MIN_VALID_SPEED_KMH,
            fallback_speed_kmh: Self::DEFAULT_FALLBACK_SPEED_KMH,
        }
    }
}

/// Settings for a tracking session
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub eta: EtaConfig,
    /// Upper bound on the last-known-position lookup before going live
    #[serde(rename = "initial_fetch_timeout_ms", with = "millis")]
    pub initial_fetch_timeout: Duration,
}

impl TrackingConfig {
    pub fn with_eta(mut self, eta: EtaConfig) -> Self {
        self.eta = eta;
        self
    }

    pub fn with_initial_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.initial_fetch_timeout = timeout;
        self
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            eta: EtaConfig::default(),
            initial_fetch_timeout: Duration::from_secs(5),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
