//! Pre-built [`tracing::Span`] constructors for masternode operations.
//!
//! Every log line of one ping tick or one registry enumeration carries the
//! same span, so a tick's decision can be followed end to end.

use tracing::{debug_span, info_span, Span};

/// Span covering one liveness-ping tick.
pub fn ping_tick_span(id: &str, tick: u64) -> Span {
    info_span!("ping_tick", id = %id, tick)
}

/// Span covering one active-list enumeration requested by a caller.
pub fn masternode_list_span(block: Option<u64>) -> Span {
    debug_span!("masternode_list", block = ?block)
}

/// Span covering one clock-drift check.
pub fn drift_check_span() -> Span {
    debug_span!("drift_check")
}

/// Span covering the heartbeat loop of one masternode.
pub fn heartbeat_span(id: &str) -> Span {
    info_span!("heartbeat", id = %id)
}
