//! The contract binding the registry client reads through.
//!
//! The binding hides the calling convention of the on-chain registry; only
//! the logical reads, the notification streams and gas estimation are exposed.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use vigil_types::{Address, CallRequest, ShortId};

use crate::error::RegistryError;

/// One entry of the registry's doubly linked list, as stored on chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    /// X coordinate of the packed identifier.
    pub id1: [u8; 32],
    /// Y coordinate of the packed identifier.
    pub id2: [u8; 32],
    pub account: Address,
    /// Block at which the masternode joined.
    pub origin_block: u64,
    pub online_credit: u64,
    pub last_ping_block: u64,
    pub prev: ShortId,
    pub next: ShortId,
}

/// Read and watch access to the masternode registry.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait RegistryBinding: Send + Sync {
    /// Whether `id` is currently registered (latest block).
    async fn has(&self, id: ShortId) -> Result<bool, RegistryError>;

    /// Id of the newest entry at `block`; [`ShortId::ZERO`] when empty.
    async fn last_id(&self, block: u64) -> Result<ShortId, RegistryError>;

    /// The list entry for `id` at `block`.
    async fn node_info(&self, id: ShortId, block: u64) -> Result<NodeInfo, RegistryError>;

    /// Governance contract address recorded at `block`.
    async fn governance_address(&self, block: u64) -> Result<Address, RegistryError>;

    /// Stream of short ids of masternodes that join.
    async fn watch_join(&self) -> Result<Subscription<ShortId>, RegistryError>;

    /// Stream of short ids of masternodes that quit.
    async fn watch_quit(&self) -> Result<Subscription<ShortId>, RegistryError>;

    /// Gas needed to execute `call` against the registry.
    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RegistryError>;
}

/// What a [`Subscription`] yields.
#[derive(Debug, PartialEq, Eq)]
pub enum Notification<T> {
    Event(T),
    /// The subscription is dead; the receiver should drop it.
    Failed(RegistryError),
}

/// Receiving side of a notification stream. Dropping it unsubscribes.
pub struct Subscription<T> {
    events: mpsc::Receiver<T>,
    errors: Option<oneshot::Receiver<RegistryError>>,
}

/// Producing side of a notification stream, held by the binding.
pub struct SubscriptionSender<T> {
    events: mpsc::Sender<T>,
    errors: Option<oneshot::Sender<RegistryError>>,
}

enum Step<T> {
    Event(Option<T>),
    Error(Result<RegistryError, oneshot::error::RecvError>),
}

impl<T> Subscription<T> {
    /// Create a connected sender/subscription pair with room for `capacity`
    /// undelivered events.
    pub fn channel(capacity: usize) -> (SubscriptionSender<T>, Subscription<T>) {
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let (errors_tx, errors_rx) = oneshot::channel();
        (
            SubscriptionSender {
                events: events_tx,
                errors: Some(errors_tx),
            },
            Subscription {
                events: events_rx,
                errors: Some(errors_rx),
            },
        )
    }

    /// Wait for the next event or failure.
    ///
    /// Buffered events are delivered before a pending error. A closed event
    /// channel is reported as [`RegistryError::SubscriptionClosed`].
    pub async fn next(&mut self) -> Notification<T> {
        loop {
            let Self { events, errors } = self;
            let error_signal = async {
                match errors.as_mut() {
                    Some(rx) => rx.await,
                    None => std::future::pending().await,
                }
            };
            let step = tokio::select! {
                biased;
                event = events.recv() => Step::Event(event),
                error = error_signal => Step::Error(error),
            };
            match step {
                Step::Event(Some(event)) => return Notification::Event(event),
                Step::Event(None) => return Notification::Failed(RegistryError::SubscriptionClosed),
                Step::Error(Ok(err)) => {
                    self.errors = None;
                    return Notification::Failed(err);
                }
                // sender went away without reporting; keep draining events
                Step::Error(Err(_)) => self.errors = None,
            }
        }
    }
}

impl<T> SubscriptionSender<T> {
    /// Deliver an event. Returns `false` if the subscriber is gone.
    pub async fn send(&self, event: T) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Report a failure. Only the first failure is delivered.
    pub fn fail(&mut self, err: RegistryError) {
        if let Some(tx) = self.errors.take() {
            let _ = tx.send(err);
        }
    }

    /// Whether the subscriber has dropped its end.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_delivered_in_order() {
        let (tx, mut sub) = Subscription::channel(4);
        assert!(tx.send(1u32).await);
        assert!(tx.send(2u32).await);
        assert_eq!(sub.next().await, Notification::Event(1));
        assert_eq!(sub.next().await, Notification::Event(2));
    }

    #[tokio::test]
    async fn failure_after_buffered_events() {
        let (mut tx, mut sub) = Subscription::channel(4);
        tx.send(7u32).await;
        tx.fail(RegistryError::Subscription("dropped".into()));
        assert_eq!(sub.next().await, Notification::Event(7));
        assert_eq!(
            sub.next().await,
            Notification::Failed(RegistryError::Subscription("dropped".into()))
        );
    }

    #[tokio::test]
    async fn dropped_sender_reports_closed() {
        let (tx, mut sub) = Subscription::<u32>::channel(1);
        drop(tx);
        assert_eq!(sub.next().await, Notification::Failed(RegistryError::SubscriptionClosed));
    }

    #[tokio::test]
    async fn dropping_subscription_closes_sender() {
        let (tx, sub) = Subscription::<u32>::channel(1);
        drop(sub);
        assert!(tx.is_closed());
        assert!(!tx.send(1).await);
    }
}
