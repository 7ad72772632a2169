use stop_eta_transit::TransitError;

/// Everything a tracking session can report. None of these are fatal; the
/// session degrades to a stale or unknown ETA instead.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// No route, no stops or no vehicle for the current target
    #[error("no data available: {0}")]
    DataUnavailable(String),

    #[error("position sample has invalid coordinates")]
    InvalidSample,

    #[error("live position feed failed: {0}")]
    SubscriptionFault(String),

    #[error(transparent)]
    Transit(#[from] TransitError),
}

pub type Result<T> = std::result::Result<T, TrackingError>;
