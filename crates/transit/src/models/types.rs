//! Core data types for routes, stops and vehicle positions.

use chrono::{DateTime, Utc};
use geo::Point;

use crate::identifiers::*;

// ============================================================================
// Coordinates
// ============================================================================

/// WGS84 coordinate in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and within their geographic range
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::new(c.longitude, c.latitude)
    }
}

impl From<Point> for Coordinate {
    fn from(p: Point) -> Self {
        Coordinate::new(p.y(), p.x())
    }
}

impl From<Coordinate> for geo::Coord {
    fn from(c: Coordinate) -> Self {
        geo::Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A fixed waypoint on a route
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub id: StopIdentifier,
    pub name: String,
    pub coordinate: Coordinate,
    /// Position of this stop along its route (ascending)
    pub order: u32,
}

impl Stop {
    pub fn new(id: impl Into<StopIdentifier>, coordinate: Coordinate, order: u32) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            coordinate,
            order,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A single position report from a vehicle.
///
/// `speed_kmh` is `None` when the device did not report one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehiclePosition {
    pub vehicle: VehicleIdentifier,
    pub coordinate: Coordinate,
    pub speed_kmh: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl VehiclePosition {
    pub fn new(vehicle: impl Into<VehicleIdentifier>, coordinate: Coordinate) -> Self {
        Self {
            vehicle: vehicle.into(),
            coordinate,
            speed_kmh: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_speed(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = Some(speed_kmh);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.coordinate.is_valid()
    }
}

/// Where a rider is headed: the vehicle they ride, its route and their stop
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiderAssignment {
    pub vehicle: VehicleIdentifier,
    pub route: RouteIdentifier,
    pub stop: Option<StopIdentifier>,
}

// ============================================================================
// Errors
// ============================================================================

/// A collaborator failed to answer. Missing records are `Ok(None)`, not errors.
#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
