//! Pluggable collaborator traits.
//!
//! External crates implement these to supply route data and vehicle positions
//! from whatever backend they use (a database, an HTTP API, a pub/sub channel).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::identifiers::*;
use crate::models::{Result, RiderAssignment, Route, VehiclePosition};

/// Look up routes and their ordered stops
pub trait RouteSource: Send + Sync {
    /// `Ok(None)` when the backend has no such route
    fn load_route<'a>(
        &'a self,
        route: &'a RouteIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Arc<Route>>>> + Send + 'a>>;
}

/// Resolve which route a vehicle runs and where a rider is headed
pub trait AssignmentSource: Send + Sync {
    fn vehicle_route<'a>(
        &'a self,
        vehicle: &'a VehicleIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RouteIdentifier>>> + Send + 'a>>;

    fn rider_assignment<'a>(
        &'a self,
        rider: &'a RiderIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RiderAssignment>>> + Send + 'a>>;
}

/// One-shot lookup of the most recent stored position
pub trait PositionHistory: Send + Sync {
    fn last_known<'a>(
        &'a self,
        vehicle: &'a VehicleIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<VehiclePosition>>> + Send + 'a>>;
}

/// Something the live feed pushes to a subscriber
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    Position(VehiclePosition),
    /// The transport reported a connection problem
    Fault(String),
}

/// Callback invoked for every event, in arrival order
pub type PositionSink = Arc<dyn Fn(FeedEvent) + Send + Sync>;

/// Handle to an open live subscription.
///
/// After `close` returns the feed must not invoke the sink again.
pub trait FeedSubscription: Send + Sync {
    fn close(&mut self);
}

/// Push-based stream of live vehicle positions
pub trait PositionFeed: Send + Sync {
    fn subscribe(
        &self,
        vehicle: &VehicleIdentifier,
        sink: PositionSink,
    ) -> Result<Box<dyn FeedSubscription>>;
}
