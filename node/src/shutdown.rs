//! Cancellation signal for the manager's background tasks.
//!
//! A `tokio::sync::broadcast` channel: each long-running task subscribes
//! before it is spawned and `select!`s on its receiver alongside its main
//! loop.

use tokio::sync::broadcast;

/// Coordinates shutdown of the heartbeat loop and the sync watcher.
///
/// A receiver also resolves when the controller is dropped, so tasks never
/// outlive their manager.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Get a receiver that will be notified on shutdown.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn programmatic_shutdown_notifies_subscribers() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();
        controller.shutdown();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn multiple_subscribers_all_notified() {
        let controller = ShutdownController::new();
        let mut rx1 = controller.subscribe();
        let mut rx2 = controller.subscribe();
        controller.shutdown();
        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn dropping_controller_closes_receivers() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();
        drop(controller);
        assert!(rx.recv().await.is_err());
    }
}
