pub mod config;
pub mod feed;
pub mod tracking;

// Re-export transit from the transit crate
pub use stop_eta_transit as transit;

pub use config::{EtaConfig, TrackingConfig};
pub use tracking::{
    Collaborators, SessionSnapshot, SessionState, TrackingError, TrackingResult, TrackingSession,
    TrackingTarget,
};
