//! Binding a live position stream to arrival estimates.
//!
//! A [`TrackingSession`] follows one vehicle for one observer. It resolves the
//! vehicle's route, seeds itself from the last stored position, then opens a
//! single live subscription and recomputes a [`TrackingResult`] inside every
//! callback. Every change is published as a [`SessionSnapshot`] on a watch
//! channel for the rendering layer.
//!
//! Each subscription is tagged with a generation number. Detaching bumps the
//! generation, so a feed that keeps calling an old sink after `close` cannot
//! touch the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use stop_eta_transit::{
    AssignmentSource, FeedEvent, FeedSubscription, PositionFeed, PositionHistory, PositionSink,
    RiderIdentifier, Route, RouteIdentifier, RouteSource, StaticTransitProvider, StopIdentifier,
    VehicleIdentifier, VehiclePosition,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::TrackingConfig;
use crate::tracking::error::{Result, TrackingError};
use crate::tracking::eta::EtaEstimator;
use crate::tracking::result::TrackingResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No vehicle selected
    #[default]
    Unbound,
    /// Looking up the route and its stops
    Resolving,
    /// Route loaded, waiting for a first position
    Idle,
    /// Subscribed and recomputing on every sample
    Tracking,
}

/// What the session should follow
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingTarget {
    /// A vehicle, optionally measured against one of its route's stops
    Vehicle {
        vehicle: VehicleIdentifier,
        stop: Option<StopIdentifier>,
    },
    /// A rider, resolved to their vehicle and assigned stop
    Rider(RiderIdentifier),
}

impl TrackingTarget {
    pub fn vehicle(vehicle: impl Into<VehicleIdentifier>) -> Self {
        Self::Vehicle {
            vehicle: vehicle.into(),
            stop: None,
        }
    }

    pub fn vehicle_to_stop(
        vehicle: impl Into<VehicleIdentifier>,
        stop: impl Into<StopIdentifier>,
    ) -> Self {
        Self::Vehicle {
            vehicle: vehicle.into(),
            stop: Some(stop.into()),
        }
    }

    pub fn rider(rider: impl Into<RiderIdentifier>) -> Self {
        Self::Rider(rider.into())
    }
}

/// Everything the rendering layer needs from a session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub vehicle: Option<VehicleIdentifier>,
    pub route: Option<RouteIdentifier>,
    pub position: Option<VehiclePosition>,
    pub result: Option<TrackingResult>,
    /// The live feed faulted; `result` is the last one computed before that
    pub stale: bool,
    pub fault: Option<String>,
}

/// External systems a session reads from
#[derive(Clone)]
pub struct Collaborators {
    pub routes: Arc<dyn RouteSource>,
    pub assignments: Arc<dyn AssignmentSource>,
    pub history: Arc<dyn PositionHistory>,
    pub feed: Arc<dyn PositionFeed>,
}

impl Collaborators {
    /// Route data, assignments and history all served by one in-memory provider
    pub fn from_provider(provider: StaticTransitProvider, feed: Arc<dyn PositionFeed>) -> Self {
        let provider = Arc::new(provider);
        Self {
            routes: provider.clone(),
            assignments: provider.clone(),
            history: provider,
            feed,
        }
    }
}

struct Binding {
    vehicle: VehicleIdentifier,
    route: Arc<Route>,
    target_index: Option<usize>,
}

#[derive(Default)]
struct Shared {
    generation: u64,
    /// Bumped on every change to `snapshot`
    version: u64,
    binding: Option<Binding>,
    snapshot: SessionSnapshot,
}

/// State reachable from feed callbacks
struct SessionCore {
    shared: Mutex<Shared>,
    updates: watch::Sender<SessionSnapshot>,
    /// Version of the snapshot last sent on `updates`
    published: AtomicU64,
    estimator: EtaEstimator,
}

impl SessionCore {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the lock, then publish the snapshot it guarded.
    ///
    /// The watch lock is never taken while the session lock is held. Versions
    /// keep publishes from racing threads in order.
    fn commit(&self, mut shared: MutexGuard<'_, Shared>) {
        shared.version += 1;
        let version = shared.version;
        let snapshot = shared.snapshot.clone();
        drop(shared);

        self.updates.send_if_modified(|current| {
            if version <= self.published.load(Ordering::Acquire) {
                return false;
            }
            self.published.store(version, Ordering::Release);
            *current = snapshot;
            true
        });
    }

    fn update(&self, f: impl FnOnce(&mut Shared)) {
        let mut shared = self.lock();
        f(&mut shared);
        self.commit(shared);
    }

    fn on_event(&self, generation: u64, event: FeedEvent) {
        let mut shared = self.lock();
        if shared.generation != generation {
            debug!(generation, "ignoring event from a closed subscription");
            return;
        }

        match event {
            FeedEvent::Position(position) => {
                if self.apply_position(&mut shared, position, true).is_ok() {
                    self.commit(shared);
                }
            }
            FeedEvent::Fault(message) => {
                warn!(fault = %message, "live position feed fault");
                shared.snapshot.stale = true;
                shared.snapshot.fault = Some(message);
                self.commit(shared);
            }
        }
    }

    /// Validate a sample, make it current and recompute. A live sample also
    /// moves an idle session into tracking.
    fn apply_position(
        &self,
        shared: &mut Shared,
        position: VehiclePosition,
        live: bool,
    ) -> Result<TrackingResult> {
        let Some(binding) = &shared.binding else {
            return Err(TrackingError::DataUnavailable("no route bound".into()));
        };

        if !position.is_valid() {
            warn!(vehicle = %position.vehicle, "dropping position with invalid coordinates");
            return Err(TrackingError::InvalidSample);
        }
        if position.vehicle != binding.vehicle {
            warn!(
                expected = %binding.vehicle,
                got = %position.vehicle,
                "dropping position for another vehicle"
            );
            return Err(TrackingError::InvalidSample);
        }

        let result =
            TrackingResult::compute(&binding.route, binding.target_index, &position, &self.estimator);
        debug!(
            vehicle = %position.vehicle,
            nearest = result.nearest_stop_index,
            remaining_km = ?result.remaining_distance_km,
            eta_minutes = ?result.eta_minutes,
            reached = result.reached,
            "recomputed"
        );

        let snapshot = &mut shared.snapshot;
        snapshot.position = Some(position);
        snapshot.result = Some(result.clone());
        snapshot.stale = false;
        snapshot.fault = None;
        if live && snapshot.state == SessionState::Idle {
            info!("first live sample, tracking");
            snapshot.state = SessionState::Tracking;
        }

        Ok(result)
    }
}

/// Live arrival tracking for one observer and one vehicle
pub struct TrackingSession {
    core: Arc<SessionCore>,
    collaborators: Collaborators,
    config: TrackingConfig,
    target: Option<TrackingTarget>,
    subscription: Option<Box<dyn FeedSubscription>>,
}

impl TrackingSession {
    pub fn new(collaborators: Collaborators, config: TrackingConfig) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        let core = SessionCore {
            shared: Mutex::new(Shared::default()),
            updates,
            published: AtomicU64::new(0),
            estimator: EtaEstimator::new(config.eta),
        };

        Self {
            core: Arc::new(core),
            collaborators,
            config,
            target: None,
            subscription: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.core.lock().snapshot.state
    }

    pub fn result(&self) -> Option<TrackingResult> {
        self.core.lock().snapshot.result.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.core.lock().snapshot.clone()
    }

    pub fn target(&self) -> Option<&TrackingTarget> {
        self.target.as_ref()
    }

    /// Receive a new snapshot on every change
    pub fn updates(&self) -> watch::Receiver<SessionSnapshot> {
        self.core.updates.subscribe()
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start following a new target, dropping whatever was followed before.
    ///
    /// Returns the state reached: `Tracking` once a position is known, `Idle`
    /// when the initial lookup timed out, failed or returned an unusable
    /// position (the live feed is open and will move the session on). Missing routes leave the session in
    /// `Resolving` and return [`TrackingError::DataUnavailable`].
    pub async fn select_target(&mut self, target: TrackingTarget) -> Result<SessionState> {
        self.detach(SessionState::Resolving);
        self.target = Some(target);
        self.bind().await
    }

    /// Reload the route after it was edited and resubscribe
    pub async fn refresh_route(&mut self) -> Result<SessionState> {
        if self.target.is_none() {
            return Err(TrackingError::DataUnavailable("no target selected".into()));
        }

        info!("route changed, re-resolving");
        self.detach(SessionState::Resolving);
        self.bind().await
    }

    /// Feed one position through the same path as live samples, without
    /// changing the session state
    pub fn recompute(&self, position: VehiclePosition) -> Result<TrackingResult> {
        let mut shared = self.core.lock();
        let result = self.core.apply_position(&mut shared, position, false)?;
        self.core.commit(shared);
        Ok(result)
    }

    /// Close the subscription and forget the target
    pub fn dispose(&mut self) {
        self.detach(SessionState::Unbound);
        self.target = None;
        info!("session disposed");
    }

    fn release_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
    }

    /// Close the live subscription before anything else happens, invalidate
    /// its sink and reset derived state
    fn detach(&mut self, state: SessionState) {
        self.release_subscription();
        self.core.update(|shared| {
            shared.generation += 1;
            shared.binding = None;
            shared.snapshot = SessionSnapshot {
                state,
                ..SessionSnapshot::default()
            };
        });
    }

    async fn bind(&mut self) -> Result<SessionState> {
        let Some(target) = self.target.clone() else {
            return Err(TrackingError::DataUnavailable("no target selected".into()));
        };

        let (vehicle, route_id, stop) = match self.resolve(&target).await {
            Ok(resolved) => resolved,
            Err(error) => return Err(self.unresolved(error)),
        };
        self.core.update(|shared| {
            shared.snapshot.vehicle = Some(vehicle.clone());
            shared.snapshot.route = Some(route_id.clone());
        });

        let route = match self.collaborators.routes.load_route(&route_id).await {
            Ok(Some(route)) if !route.is_empty() => route,
            Ok(Some(_)) => {
                let error = TrackingError::DataUnavailable(format!("route {route_id} has no stops"));
                return Err(self.unresolved(error));
            }
            Ok(None) => {
                let error = TrackingError::DataUnavailable(format!("no route available for {route_id}"));
                return Err(self.unresolved(error));
            }
            Err(error) => return Err(self.unresolved(error.into())),
        };

        let target_index = stop.as_ref().and_then(|stop| route.position_of(stop));
        if let (Some(stop), None) = (&stop, target_index) {
            warn!(%stop, route = %route_id, "target stop not on route, tracking position only");
        }

        info!(%vehicle, route = %route_id, stops = route.len(), "route resolved");
        self.core.update(|shared| {
            shared.binding = Some(Binding {
                vehicle: vehicle.clone(),
                route,
                target_index,
            });
            shared.snapshot.state = SessionState::Idle;
        });

        let seeded = self.seed_from_history(&vehicle).await;
        self.open_subscription(&vehicle)?;

        if seeded {
            self.core.update(|shared| shared.snapshot.state = SessionState::Tracking);
        }

        Ok(self.state())
    }

    async fn resolve(
        &self,
        target: &TrackingTarget,
    ) -> Result<(VehicleIdentifier, RouteIdentifier, Option<StopIdentifier>)> {
        match target {
            TrackingTarget::Vehicle { vehicle, stop } => {
                let route = self
                    .collaborators
                    .assignments
                    .vehicle_route(vehicle)
                    .await?
                    .ok_or_else(|| {
                        TrackingError::DataUnavailable(format!("no route assigned to {vehicle}"))
                    })?;
                Ok((vehicle.clone(), route, stop.clone()))
            }
            TrackingTarget::Rider(rider) => {
                let assignment = self
                    .collaborators
                    .assignments
                    .rider_assignment(rider)
                    .await?
                    .ok_or_else(|| {
                        TrackingError::DataUnavailable(format!("no vehicle assigned to {rider}"))
                    })?;
                Ok((assignment.vehicle, assignment.route, assignment.stop))
            }
        }
    }

    /// Record why resolving stopped; the session stays in `Resolving`
    fn unresolved(&self, error: TrackingError) -> TrackingError {
        warn!(%error, "could not resolve target");
        let message = error.to_string();
        self.core.update(|shared| shared.snapshot.fault = Some(message));
        error
    }

    /// One-shot lookup of the last stored position. Returns whether the lookup
    /// completed with a usable position or with none at all.
    async fn seed_from_history(&self, vehicle: &VehicleIdentifier) -> bool {
        let lookup = self.collaborators.history.last_known(vehicle);

        match tokio::time::timeout(self.config.initial_fetch_timeout, lookup).await {
            Ok(Ok(Some(position))) => match self.recompute(position) {
                Ok(_) => true,
                Err(error) => {
                    warn!(%vehicle, %error, "last known position not usable");
                    false
                }
            },
            Ok(Ok(None)) => {
                debug!(%vehicle, "no last known position");
                true
            }
            Ok(Err(error)) => {
                warn!(%vehicle, %error, "last known position lookup failed");
                false
            }
            Err(_) => {
                warn!(
                    %vehicle,
                    timeout = ?self.config.initial_fetch_timeout,
                    "last known position lookup timed out"
                );
                false
            }
        }
    }

    fn open_subscription(&mut self, vehicle: &VehicleIdentifier) -> Result<()> {
        debug_assert!(self.subscription.is_none());

        let generation = self.core.lock().generation;
        let core: Weak<SessionCore> = Arc::downgrade(&self.core);
        let sink: PositionSink = Arc::new(move |event| {
            if let Some(core) = core.upgrade() {
                core.on_event(generation, event);
            }
        });

        match self.collaborators.feed.subscribe(vehicle, sink) {
            Ok(subscription) => {
                debug!(%vehicle, generation, "subscribed to live positions");
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(error) => {
                warn!(%vehicle, %error, "could not subscribe to live positions");
                let message = error.to_string();
                self.core.update(|shared| {
                    shared.snapshot.stale = true;
                    shared.snapshot.fault = Some(message.clone());
                });
                Err(TrackingError::SubscriptionFault(message))
            }
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.release_subscription();
    }
}
