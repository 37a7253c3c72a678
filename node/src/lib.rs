//! Masternode manager for a vigil node.
//!
//! The manager is the node-side half of the masternode protocol:
//! - Tracks whether the local node is a registered masternode, from the
//!   registry and its join/quit notifications
//! - Tracks whether the chain is syncing, from the sync-event bus
//! - Sends a signed liveness ping to the registry every ping interval when
//!   the account has the stake and the power to pay for it
//! - Checks the local clock against network time
//! - Signs hashes on behalf of the local masternode and passes active-list
//!   and governance reads through to the registry

pub mod config;
pub mod error;
mod heartbeat;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod shutdown;
pub mod sync_event;
pub mod tracing_spans;

pub use config::MasternodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, init_logging_from, LogFormat};
pub use manager::{
    Collaborators, MasternodeManager, MasternodeStatus, PingOutcome, ServerIdentity, SkipReason,
};
pub use metrics::MasternodeMetrics;
pub use shutdown::ShutdownController;
pub use sync_event::{SyncEvent, SyncEventBus};
