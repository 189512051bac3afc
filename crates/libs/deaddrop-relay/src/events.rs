use crate::delivery::DeliveryCoordinator;
use deaddrop_core::{ChannelId, IdentityRef};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Reachability change reported by the session transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    /// The identity opened a channel. Replaces any previous binding and
    /// triggers a drain of its staged backlog.
    Reachable { identity: IdentityRef, channel: ChannelId },
    /// The identity's channel went away.
    Unreachable { identity: IdentityRef },
}

/// Pump presence events into the coordinator until the sender side closes.
pub fn spawn_presence_worker(
    coordinator: DeliveryCoordinator,
    mut events_rx: UnboundedReceiver<PresenceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            coordinator.handle_presence_event(event).await;
        }
        log::debug!("presence: event channel closed, worker exiting");
    })
}
