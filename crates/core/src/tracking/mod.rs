//! Locating a vehicle on its route and estimating arrival at a stop.

pub mod accumulator;
pub mod error;
pub mod eta;
pub mod indexer;
pub mod result;
pub mod session;

pub use accumulator::remaining_distance;
pub use error::{Result, TrackingError};
pub use eta::EtaEstimator;
pub use indexer::nearest_index;
pub use result::TrackingResult;
pub use session::{Collaborators, SessionSnapshot, SessionState, TrackingSession, TrackingTarget};
