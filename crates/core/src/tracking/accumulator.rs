//! Distance left to travel along a route.

use stop_eta_transit::{Stop, haversine_distance_km};

/// Kilometers from stop `from` to stop `to`, following the route stop by stop.
///
/// `to = None` means no target was resolved and sums to the end of the route.
/// A target beyond the last stop is clamped to it. The result is `0.0` when
/// `from` has already reached or passed the target, or the route has fewer
/// than two stops.
pub fn remaining_distance(stops: &[Stop], from: usize, to: Option<usize>) -> f64 {
    if stops.len() < 2 {
        return 0.0;
    }

    let last = stops.len() - 1;
    let end = to.map_or(last, |to| to.min(last));

    if from >= end {
        return 0.0;
    }

    stops[from..=end]
        .windows(2)
        .map(|pair| haversine_distance_km(pair[0].coordinate, pair[1].coordinate))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use stop_eta_transit::Coordinate;

    fn route() -> Vec<Stop> {
        [(0.0, 0.0), (0.0, 0.01), (0.0, 0.03), (0.01, 0.03)]
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| Stop::new(format!("s{i}"), Coordinate::new(lat, lon), i as u32))
            .collect()
    }

    fn leg(stops: &[Stop], i: usize) -> f64 {
        haversine_distance_km(stops[i].coordinate, stops[i + 1].coordinate)
    }

    #[test]
    fn test_same_or_passed_index_is_zero() {
        let stops = route();
        for i in 0..stops.len() {
            assert_eq!(remaining_distance(&stops, i, Some(i)), 0.0);
        }
        assert_eq!(remaining_distance(&stops, 3, Some(1)), 0.0);
        assert_eq!(remaining_distance(&stops, 2, Some(0)), 0.0);
    }

    #[test]
    fn test_full_route_equals_sum_of_legs() {
        let stops = route();
        let expected: f64 = (0..stops.len() - 1).map(|i| leg(&stops, i)).sum();

        assert_relative_eq!(
            remaining_distance(&stops, 0, Some(stops.len() - 1)),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_partial_span() {
        let stops = route();
        assert_relative_eq!(
            remaining_distance(&stops, 1, Some(3)),
            leg(&stops, 1) + leg(&stops, 2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unresolved_target_sums_to_end() {
        let stops = route();
        assert_relative_eq!(
            remaining_distance(&stops, 1, None),
            remaining_distance(&stops, 1, Some(3)),
            epsilon = 1e-12
        );
        assert_eq!(remaining_distance(&stops, 3, None), 0.0);
    }

    #[test]
    fn test_target_past_end_is_clamped() {
        let stops = route();
        assert_relative_eq!(
            remaining_distance(&stops, 0, Some(42)),
            remaining_distance(&stops, 0, Some(3)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_short_routes() {
        let stops = route();
        assert_eq!(remaining_distance(&[], 0, Some(3)), 0.0);
        assert_eq!(remaining_distance(&stops[..1], 0, None), 0.0);
    }
}
