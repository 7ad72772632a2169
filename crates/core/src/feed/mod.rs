//! Position feed implementations.

pub mod broadcast;

pub use broadcast::BroadcastFeed;
