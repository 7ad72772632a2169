//! # stop-eta-transit
//!
//! Route and stop data for live arrival tracking.
//!
//! ## Features
//!
//! - **Ordered routes**: stops sorted by their route order, shared as `Arc<Route>`
//! - **Great-circle distances**: Haversine distance between coordinates in kilometers
//! - **Pluggable collaborators**: implement your own route lookup, position history
//!   and live position feed
//! - **In-memory provider**: a ready-made backend for tests and embedded use
//!
//! ## Example
//!
//! ```
//! use stop_eta_transit::prelude::*;
//!
//! let route = Route::new(
//!     "loop",
//!     vec![
//!         Stop::new("gate", Coordinate::new(28.6139, 77.2090), 0),
//!         Stop::new("library", Coordinate::new(28.6145, 77.2095), 1),
//!         Stop::new("hostel", Coordinate::new(28.6150, 77.2100), 2),
//!     ],
//! );
//!
//! let provider = StaticTransitProvider::from_routes([route]);
//! provider.assign_vehicle("bus-1", "loop");
//!
//! let route = provider.get_route(&RouteIdentifier::new("loop")).unwrap();
//! assert_eq!(route.position_of(&StopIdentifier::new("hostel")), Some(2));
//! assert!(route.total_length_km() > 0.0);
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{route::*, types::*};
    pub use crate::network::traits::*;
    pub use crate::provider::static_provider::StaticTransitProvider;
    pub use crate::spatial::queries::haversine_distance_km;
}

pub use prelude::*;
