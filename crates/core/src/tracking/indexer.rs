//! Locating a vehicle on its route.

use stop_eta_transit::{Coordinate, Stop, haversine_distance_km};

/// Index of the stop closest to `position`.
///
/// Ties go to the earliest stop. An empty slice yields `0`, so callers must
/// check for an empty route themselves rather than trust the index.
///
/// This matches against stops, not against the segments between them. On
/// loops or routes that double back, a vehicle between two stops can briefly
/// match a non-adjacent stop that happens to be closer.
pub fn nearest_index(position: Coordinate, stops: &[Stop]) -> usize {
    let mut best_index = 0;
    let mut best_distance = f64::INFINITY;

    for (index, stop) in stops.iter().enumerate() {
        let distance = haversine_distance_km(position, stop.coordinate);
        if distance < best_distance {
            best_distance = distance;
            best_index = index;
        }
    }

    best_index
}
