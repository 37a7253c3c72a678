//! The heartbeat loop and the sync-status watcher.
//!
//! The heartbeat loop is a single dispatcher: each wakeup (shutdown, a join
//! or quit notification, the drift timer, the ping timer) is turned into a
//! [`Wakeup`] inside `select!` and handled after it, one per iteration.
//! Registry and chain calls made outside that `select!` are raced against
//! shutdown too, so a hung collaborator cannot keep the loop alive.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{sleep, Instant};
use tracing::Instrument;
use vigil_registry::{Notification, RegistryError, Subscription};
use vigil_types::ShortId;

use crate::manager::{LocalSummary, Shared};
use crate::sync_event::SyncEvent;
use crate::tracing_spans::{drift_check_span, ping_tick_span};

enum Wakeup {
    Shutdown,
    Join(Notification<ShortId>),
    Quit(Notification<ShortId>),
    DriftTimer,
    PingTimer,
}

pub(crate) async fn run(shared: Arc<Shared>, mut shutdown: broadcast::Receiver<()>) {
    let Some(local) = shared.local() else {
        tracing::error!("heartbeat started without a local identity");
        return;
    };

    let startup = async {
        check_membership(&shared, &local).await;
        let joins = subscribed("join", shared.registry.watch_join().await);
        let quits = subscribed("quit", shared.registry.watch_quit().await);
        (joins, quits)
    };
    let (mut joins, mut quits) = tokio::select! {
        biased;
        _ = shutdown.recv() => {
            tracing::info!("heartbeat stopped during startup");
            return;
        }
        subscriptions = startup => subscriptions,
    };

    let config = &shared.config;
    let drift_timer = sleep(config.drift_check_initial_delay());
    let ping_timer = sleep(config.ping_interval());
    tokio::pin!(drift_timer, ping_timer);
    let mut tick = 0u64;

    loop {
        let wakeup = tokio::select! {
            biased;
            _ = shutdown.recv() => Wakeup::Shutdown,
            n = next_notification(&mut joins) => Wakeup::Join(n),
            n = next_notification(&mut quits) => Wakeup::Quit(n),
            _ = &mut drift_timer => Wakeup::DriftTimer,
            _ = &mut ping_timer => Wakeup::PingTimer,
        };

        match wakeup {
            Wakeup::Shutdown => break,
            Wakeup::Join(Notification::Event(id)) => {
                shared.metrics.joins_seen.inc();
                tracing::debug!(joined = %id, "masternode joined");
                if id == local.short_id {
                    shared.set_registered(true);
                }
            }
            Wakeup::Join(Notification::Failed(e)) => {
                tracing::warn!(error = %e, "join subscription failed, no longer watching joins");
                joins = None;
            }
            Wakeup::Quit(Notification::Event(id)) => {
                shared.metrics.quits_seen.inc();
                tracing::debug!(quit = %id, "masternode quit");
                if id == local.short_id {
                    shared.set_registered(false);
                }
            }
            Wakeup::Quit(Notification::Failed(e)) => {
                tracing::warn!(error = %e, "quit subscription failed, no longer watching quits");
                quits = None;
            }
            Wakeup::DriftTimer => {
                spawn_drift_check(&shared);
                drift_timer
                    .as_mut()
                    .reset(Instant::now() + config.drift_check_interval());
            }
            Wakeup::PingTimer => {
                ping_timer.as_mut().reset(Instant::now() + config.ping_interval());
                tick += 1;
                let outcome = tokio::select! {
                    biased;
                    _ = shutdown.recv() => break,
                    outcome = shared.ping_tick().instrument(ping_tick_span(&local.id, tick)) => outcome,
                };
                tracing::debug!(tick, ?outcome, "ping tick finished");
            }
        }
    }
    tracing::info!("heartbeat stopped");
}

/// Adopt the registry's view of the local node once, at loop entry.
async fn check_membership(shared: &Shared, local: &LocalSummary) {
    match shared.registry.has(local.short_id).await {
        Ok(true) => shared.set_registered(true),
        Ok(false) => {
            shared.set_registered(false);
            if shared.config.seek_registration {
                tracing::info!(
                    payload = %vigil_registry::registration_call_data(&local.node_id),
                    registry = %shared.registry.params().registry_address,
                    "not a masternode; submit this call data to the registry to register"
                );
            } else {
                tracing::info!("not a masternode");
            }
        }
        Err(e) => tracing::warn!(error = %e, "initial membership check failed"),
    }
}

fn subscribed(
    stream: &'static str,
    result: Result<Subscription<ShortId>, RegistryError>,
) -> Option<Subscription<ShortId>> {
    match result {
        Ok(sub) => Some(sub),
        Err(e) => {
            tracing::warn!(stream, error = %e, "cannot subscribe to registry notifications");
            None
        }
    }
}

/// Next notification of a live subscription; never resolves once torn down.
async fn next_notification(sub: &mut Option<Subscription<ShortId>>) -> Notification<ShortId> {
    match sub {
        Some(sub) => sub.next().await,
        None => std::future::pending().await,
    }
}

/// Run a drift check on its own task so a slow NTP server cannot stall the
/// dispatcher.
fn spawn_drift_check(shared: &Arc<Shared>) {
    let shared = Arc::clone(shared);
    tokio::spawn(
        async move {
            match shared.drift_monitor.check_drift().await {
                Ok(report) => {
                    shared.metrics.drift_checks.inc();
                    shared.metrics.clock_offset_ms.set(report.offset_ms);
                }
                Err(e) => tracing::debug!(error = %e, "clock drift check failed"),
            }
        }
        .instrument(drift_check_span()),
    );
}

/// Track chain sync: `Started` sets the syncing flag, `Done` and `Failed`
/// clear it.
///
/// The flag follows the newest event received. Events dropped while the
/// watcher lagged are not replayed; the next event delivered corrects it.
pub(crate) async fn watch_sync(
    shared: Arc<Shared>,
    mut events: broadcast::Receiver<SyncEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let received = tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            received = events.recv() => received,
        };
        match received {
            Ok(event) => {
                if let SyncEvent::Failed(reason) = &event {
                    tracing::debug!(%reason, "chain sync failed");
                }
                shared.set_syncing(event.is_syncing());
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "sync watcher lagged behind sync events");
            }
            Err(RecvError::Closed) => {
                tracing::debug!("sync event bus closed");
                break;
            }
        }
    }
}
