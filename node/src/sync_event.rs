//! Chain-sync notifications the manager subscribes to.

use tokio::sync::broadcast;

/// Progress of the node's chain synchronisation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    /// A sync round started; local state may be stale.
    Started,
    /// The sync round caught up with the network.
    Done,
    /// The sync round was abandoned.
    Failed(String),
}

impl SyncEvent {
    /// Whether the node should consider itself syncing after this event.
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncEvent::Started)
    }
}

/// Fan-out bus for [`SyncEvent`]s.
///
/// Subscribers each get their own receiver; a slow subscriber lags and skips
/// events rather than stalling the publisher.
pub struct SyncEventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl SyncEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Returns the number of subscribers reached.
    pub fn emit(&self, event: SyncEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SyncEventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
