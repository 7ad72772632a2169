//! In-memory provider for routes, assignments and last known positions.
//!
//! Backs tests and embedders that keep everything in process. Routes can be
//! replaced while sessions are running; sessions holding the old `Arc<Route>`
//! keep a consistent view until they re-resolve.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::identifiers::*;
use crate::models::{Result, RiderAssignment, Route, VehiclePosition};
use crate::network::traits::{AssignmentSource, PositionHistory, RouteSource};

#[derive(Default)]
struct ProviderData {
    routes: HashMap<RouteIdentifier, Arc<Route>>,
    vehicle_routes: HashMap<VehicleIdentifier, RouteIdentifier>,
    rider_assignments: HashMap<RiderIdentifier, RiderAssignment>,
    last_positions: HashMap<VehicleIdentifier, VehiclePosition>,
}

/// In-memory transit provider
///
/// This type is cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct StaticTransitProvider {
    data: Arc<RwLock<ProviderData>>,
}

impl StaticTransitProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Build provider from a set of routes
    pub fn from_routes(routes: impl IntoIterator<Item = Route>) -> Self {
        let provider = Self::new();
        for route in routes {
            provider.upsert_route(route);
        }
        provider
    }

    fn read(&self) -> RwLockReadGuard<'_, ProviderData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProviderData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a route, returning the shared handle
    pub fn upsert_route(&self, route: Route) -> Arc<Route> {
        let route = Arc::new(route);
        self.write().routes.insert(route.id.clone(), route.clone());
        route
    }

    pub fn remove_route(&self, id: &RouteIdentifier) -> Option<Arc<Route>> {
        self.write().routes.remove(id)
    }

    pub fn get_route(&self, id: &RouteIdentifier) -> Option<Arc<Route>> {
        self.read().routes.get(id).cloned()
    }

    pub fn all_routes(&self) -> Vec<Arc<Route>> {
        self.read().routes.values().cloned().collect()
    }

    pub fn assign_vehicle(&self, vehicle: impl Into<VehicleIdentifier>, route: impl Into<RouteIdentifier>) {
        self.write()
            .vehicle_routes
            .insert(vehicle.into(), route.into());
    }

    pub fn assign_rider(&self, rider: impl Into<RiderIdentifier>, assignment: RiderAssignment) {
        self.write()
            .rider_assignments
            .insert(rider.into(), assignment);
    }

    /// Store a position as the vehicle's latest, replacing any older one
    pub fn record_position(&self, position: VehiclePosition) {
        self.write()
            .last_positions
            .insert(position.vehicle.clone(), position);
    }
}

impl RouteSource for StaticTransitProvider {
    fn load_route<'a>(
        &'a self,
        route: &'a RouteIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Arc<Route>>>> + Send + 'a>> {
        let found = self.get_route(route);
        Box::pin(async move { Ok(found) })
    }
}

impl AssignmentSource for StaticTransitProvider {
    fn vehicle_route<'a>(
        &'a self,
        vehicle: &'a VehicleIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RouteIdentifier>>> + Send + 'a>> {
        let found = self.read().vehicle_routes.get(vehicle).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn rider_assignment<'a>(
        &'a self,
        rider: &'a RiderIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RiderAssignment>>> + Send + 'a>> {
        let found = self.read().rider_assignments.get(rider).cloned();
        Box::pin(async move { Ok(found) })
    }
}

impl PositionHistory for StaticTransitProvider {
    fn last_known<'a>(
        &'a self,
        vehicle: &'a VehicleIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Option<VehiclePosition>>> + Send + 'a>> {
        let found = self.read().last_positions.get(vehicle).cloned();
        Box::pin(async move { Ok(found) })
    }
}
