//! Collaborator abstractions for route data and position streams.

pub mod traits;

pub use traits::{
    AssignmentSource, FeedEvent, FeedSubscription, PositionFeed, PositionHistory, PositionSink,
    RouteSource,
};
