//! Nullable drift monitor: counts checks and reports a programmed offset.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use vigil_network::{DriftMonitor, DriftReport, NetworkError};

pub struct NullDriftMonitor {
    offset_ms: AtomicI64,
    max_drift_ms: i64,
    checks: AtomicUsize,
    checked: Notify,
}

impl NullDriftMonitor {
    pub fn new(max_drift_ms: i64) -> Self {
        Self {
            offset_ms: AtomicI64::new(0),
            max_drift_ms,
            checks: AtomicUsize::new(0),
            checked: Notify::new(),
        }
    }

    pub fn set_offset(&self, offset_ms: i64) {
        self.offset_ms.store(offset_ms, Ordering::SeqCst);
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Wait until the next check completes.
    pub async fn wait_for_check(&self) {
        self.checked.notified().await;
    }
}

impl Default for NullDriftMonitor {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl DriftMonitor for NullDriftMonitor {
    async fn check_drift(&self) -> Result<DriftReport, NetworkError> {
        let offset_ms = self.offset_ms.load(Ordering::SeqCst);
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.checked.notify_waiters();
        Ok(DriftReport {
            offset_ms,
            smoothed_ms: offset_ms,
            max_drift_ms: self.max_drift_ms,
        })
    }
}
