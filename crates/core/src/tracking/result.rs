use std::fmt;

use stop_eta_transit::{Route, VehiclePosition};

use crate::tracking::{accumulator::remaining_distance, eta::EtaEstimator, indexer::nearest_index};

/// Where the vehicle is relative to the rider's stop, as of the latest sample.
///
/// `remaining_distance_km` and `eta_minutes` are `None` when the session has
/// no target stop to measure against.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingResult {
    pub nearest_stop_index: usize,
    pub remaining_distance_km: Option<f64>,
    pub eta_minutes: Option<u32>,
    pub reached: bool,
}

impl TrackingResult {
    /// Recompute from scratch for one position. Pure, so the same inputs
    /// always give the same result.
    pub fn compute(
        route: &Route,
        target_index: Option<usize>,
        position: &VehiclePosition,
        estimator: &EtaEstimator,
    ) -> Self {
        let stops = route.stops();
        let nearest_stop_index = nearest_index(position.coordinate, stops);

        let Some(target) = target_index else {
            return Self {
                nearest_stop_index,
                remaining_distance_km: None,
                eta_minutes: None,
                reached: false,
            };
        };

        if nearest_stop_index >= target {
            return Self {
                nearest_stop_index,
                remaining_distance_km: Some(0.0),
                eta_minutes: Some(0),
                reached: true,
            };
        }

        let remaining = remaining_distance(stops, nearest_stop_index, Some(target));
        Self {
            nearest_stop_index,
            remaining_distance_km: Some(remaining),
            eta_minutes: Some(estimator.estimate(remaining, position.speed_kmh)),
            reached: false,
        }
    }

    /// Remaining distance with two decimals, e.g. `"1.25"`
    pub fn distance_label(&self) -> Option<String> {
        self.remaining_distance_km.map(|km| format!("{km:.2}"))
    }
}

impl fmt::Display for TrackingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reached {
            return write!(f, "Arrived");
        }

        match (self.eta_minutes, self.remaining_distance_km) {
            (Some(minutes), Some(km)) => write!(f, "Arriving in {minutes} mins / {km:.2} km away"),
            _ => write!(f, "Stop {}", self.nearest_stop_index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stop_eta_transit::{Coordinate, Stop};

    fn delhi_route() -> Route {
        Route::new(
            "delhi",
            vec![
                Stop::new("s0", Coordinate::new(28.6139, 77.2090), 0),
                Stop::new("s1", Coordinate::new(28.6145, 77.2095), 1),
                Stop::new("s2", Coordinate::new(28.6150, 77.2100), 2),
            ],
        )
    }

    fn at(coordinate: Coordinate, speed: f64) -> VehiclePosition {
        VehiclePosition::new("bus-1", coordinate).with_speed(speed)
    }

    #[test]
    fn test_vehicle_at_first_stop() {
        let route = delhi_route();
        let result = TrackingResult::compute(
            &route,
            Some(2),
            &at(Coordinate::new(28.6139, 77.2090), 0.0),
            &EtaEstimator::default(),
        );

        assert_eq!(result.nearest_stop_index, 0);
        assert!(result.remaining_distance_km.unwrap() > 0.0);
        assert!(result.eta_minutes.unwrap() > 0);
        assert!(!result.reached);
    }

    #[test]
    fn test_vehicle_at_or_past_target() {
        let route = delhi_route();
        let estimator = EtaEstimator::default();

        for coordinate in [Coordinate::new(28.6150, 77.2100), Coordinate::new(28.6170, 77.2120)] {
            let result = TrackingResult::compute(&route, Some(2), &at(coordinate, 20.0), &estimator);

            assert_eq!(result.remaining_distance_km, Some(0.0));
            assert_eq!(result.eta_minutes, Some(0));
            assert!(result.reached);
        }
    }

    #[test]
    fn test_no_target_tracks_index_only() {
        let route = delhi_route();
        let result = TrackingResult::compute(
            &route,
            None,
            &at(Coordinate::new(28.6145, 77.2095), 30.0),
            &EtaEstimator::default(),
        );

        assert_eq!(result.nearest_stop_index, 1);
        assert_eq!(result.remaining_distance_km, None);
        assert_eq!(result.eta_minutes, None);
        assert!(!result.reached);
        assert_eq!(result.to_string(), "Stop 2");
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let route = delhi_route();
        let position = at(Coordinate::new(28.6141, 77.2092), 12.0);
        let estimator = EtaEstimator::default();

        let first = TrackingResult::compute(&route, Some(2), &position, &estimator);
        let second = TrackingResult::compute(&route, Some(2), &position, &estimator);
        assert_eq!(first, second);
    }

    #[test]
    fn test_display_and_label() {
        let result = TrackingResult {
            nearest_stop_index: 0,
            remaining_distance_km: Some(1.234),
            eta_minutes: Some(3),
            reached: false,
        };

        assert_eq!(result.distance_label().as_deref(), Some("1.23"));
        assert_eq!(result.to_string(), "Arriving in 3 mins / 1.23 km away");

        let arrived = TrackingResult {
            reached: true,
            remaining_distance_km: Some(0.0),
            eta_minutes: Some(0),
            ..result
        };
        assert_eq!(arrived.to_string(), "Arrived");
    }
}
