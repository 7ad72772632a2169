//! Great-circle distance utilities.

pub mod queries;

pub use queries::haversine_distance_km;
