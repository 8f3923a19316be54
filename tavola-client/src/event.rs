//! Bridge change notifications
//!
//! The bridge owns a broadcast channel. Every successful admin sync or
//! reservation mutation publishes [`BridgeEvent::AdminSynced`] once so views
//! can re-render from the cache.

use tokio::sync::broadcast;

/// Notification published by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Reservation cache changed
    AdminSynced,
}

impl BridgeEvent {
    /// Stable event name
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::AdminSynced => "sb:admin-synced",
        }
    }
}

impl std::fmt::Display for BridgeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sender side of the bridge event channel
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: BridgeEvent) {
        match self.tx.send(event) {
            Ok(receivers) => tracing::debug!(event = %event, receivers, "Event emitted"),
            Err(_) => tracing::trace!(event = %event, "Event emitted with no subscribers"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
