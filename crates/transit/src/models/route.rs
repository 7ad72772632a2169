//! Ordered stop sequences.

use geo::LineString;

use crate::identifiers::*;
use crate::models::types::*;
use crate::spatial::queries::haversine_distance_km;

/// A route a vehicle travels, as an ordered sequence of stops.
///
/// Stops are kept sorted by `order`, with ties broken by stop id so that two
/// routes built from the same records always index identically. A route is
/// never mutated once built; edits produce a new `Route`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Route {
    pub id: RouteIdentifier,
    pub name: String,
    stops: Vec<Stop>,
}

impl Route {
    pub fn new(id: impl Into<RouteIdentifier>, mut stops: Vec<Stop>) -> Self {
        stops.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            stops,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stop(&self, id: &StopIdentifier) -> Option<&Stop> {
        self.stops.iter().find(|s| &s.id == id)
    }

    /// Index of a stop in the ordered stop list
    pub fn position_of(&self, id: &StopIdentifier) -> Option<usize> {
        self.stops.iter().position(|s| &s.id == id)
    }

    /// Sum of every consecutive stop-to-stop distance, in kilometers
    pub fn total_length_km(&self) -> f64 {
        self.stops
            .windows(2)
            .map(|pair| haversine_distance_km(pair[0].coordinate, pair[1].coordinate))
            .sum()
    }

    /// Straight-line path through the stops, for drawing the route on a map
    pub fn geometry(&self) -> LineString {
        self.stops
            .iter()
            .map(|s| geo::Coord::from(s.coordinate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stop(id: &str, order: u32, lat: f64) -> Stop {
        Stop::new(id, Coordinate::new(lat, 77.0), order)
    }

    #[test]
    fn test_stops_sorted_by_order() {
        let route = Route::new(
            "r1",
            vec![stop("c", 3, 0.3), stop("a", 1, 0.1), stop("b", 2, 0.2)],
        );

        let ids: Vec<_> = route.stops().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_order_ties_broken_by_id() {
        let route = Route::new(
            "r1",
            vec![stop("z", 1, 0.0), stop("m", 1, 0.1), stop("first", 0, 0.2)],
        );

        let ids: Vec<_> = route.stops().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["first", "m", "z"]);
    }

    #[test]
    fn test_position_of() {
        let route = Route::new("r1", vec![stop("a", 1, 0.1), stop("b", 2, 0.2)]);

        assert_eq!(route.position_of(&StopIdentifier::new("b")), Some(1));
        assert_eq!(route.position_of(&StopIdentifier::new("missing")), None);
        assert_eq!(route.stop(&StopIdentifier::new("a")).map(|s| s.order), Some(1));
    }

    #[test]
    fn test_total_length() {
        let route = Route::new(
            "r1",
            vec![stop("a", 0, 0.0), stop("b", 1, 1.0), stop("c", 2, 2.0)],
        );

        let leg = haversine_distance_km(Coordinate::new(0.0, 77.0), Coordinate::new(1.0, 77.0));
        assert_relative_eq!(route.total_length_km(), 2.0 * leg, epsilon = 1e-9);
    }

    #[test]
    fn test_short_routes_have_no_length() {
        assert_eq!(Route::new("empty", vec![]).total_length_km(), 0.0);
        assert_eq!(Route::new("one", vec![stop("a", 0, 0.0)]).total_length_km(), 0.0);
    }

    #[test]
    fn test_geometry_follows_stop_order() {
        let route = Route::new("r1", vec![stop("b", 2, 0.2), stop("a", 1, 0.1)]);
        let line = route.geometry();

        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[0].y, 0.1);
        assert_eq!(line.0[1].y, 0.2);
    }
}
