//! Registry read-path errors.

use thiserror::Error;
use vigil_types::ShortId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry call {method} failed: {reason}")]
    CallFailed { method: &'static str, reason: String },

    #[error("subscription error: {0}")]
    Subscription(String),

    #[error("subscription channel closed")]
    SubscriptionClosed,

    #[error("gas estimation failed: {0}")]
    GasEstimation(String),

    #[error("registry list links back to {0}")]
    LinkCycle(ShortId),
}

impl RegistryError {
    pub fn call(method: &'static str, reason: impl Into<String>) -> Self {
        Self::CallFailed {
            method,
            reason: reason.into(),
        }
    }
}

/// A registry walk that stopped on a failed read.
///
/// `partial` holds the ids collected before the failure, in traversal order.
/// Callers decide whether a partial list is usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("registry walk aborted after {} ids: {source}", .partial.len())]
pub struct TraversalError {
    pub partial: Vec<String>,
    #[source]
    pub source: RegistryError,
}
