use stop_eta_transit::{
    FeedEvent, FeedSubscription, PositionFeed, PositionSink, TransitError, VehicleIdentifier,
    VehiclePosition,
};
use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// In-process position feed over a tokio broadcast channel.
///
/// Every subscription runs a small task on the current runtime that forwards
/// its vehicle's positions to the sink in publish order.
#[derive(Clone)]
pub struct BroadcastFeed {
    sender: broadcast::Sender<VehiclePosition>,
}

impl BroadcastFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a position to every subscriber; returns how many received it
    pub fn publish(&self, position: VehiclePosition) -> usize {
        self.sender.send(position).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

impl PositionFeed for BroadcastFeed {
    fn subscribe(
        &self,
        vehicle: &VehicleIdentifier,
        sink: PositionSink,
    ) -> stop_eta_transit::Result<Box<dyn FeedSubscription>> {
        let runtime = Handle::try_current().map_err(|e| TransitError::Backend(e.to_string()))?;
        let mut receiver = self.sender.subscribe();
        let vehicle = vehicle.clone();

        let task = runtime.spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(position) if position.vehicle == vehicle => {
                        sink(FeedEvent::Position(position))
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!(%vehicle, missed, "subscriber fell behind");
                        sink(FeedEvent::Fault(format!("missed {missed} positions")));
                    }
                    Err(RecvError::Closed) => {
                        debug!(%vehicle, "feed closed");
                        sink(FeedEvent::Fault("feed closed".into()));
                        break;
                    }
                }
            }
        });

        Ok(Box::new(BroadcastSubscription { task: Some(task) }))
    }
}

struct BroadcastSubscription {
    task: Option<JoinHandle<()>>,
}

impl FeedSubscription for BroadcastSubscription {
    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for BroadcastSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
