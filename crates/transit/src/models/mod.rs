//! Route, stop and position data models.

pub mod route;
pub mod types;

// Re-exports for convenience
pub use route::Route;
pub use types::{Coordinate, RiderAssignment, Stop, TransitError, VehiclePosition, Result};
