//! Periodic clock-drift check used by the heartbeat loop.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::clock_sync::{query_ntp_offset, ClockSync, DEFAULT_NTP_SERVER, NTP_TIMEOUT};
use crate::NetworkError;

/// Result of one drift check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriftReport {
    /// Offset observed by this check (network minus local), in ms.
    pub offset_ms: i64,
    /// Smoothed offset after folding in this check.
    pub smoothed_ms: i64,
    pub max_drift_ms: i64,
}

/// Compares the local clock with network time.
#[async_trait]
pub trait DriftMonitor: Send + Sync {
    async fn check_drift(&self) -> Result<DriftReport, NetworkError>;
}

/// [`DriftMonitor`] backed by an SNTP server.
pub struct NtpDriftMonitor {
    server: String,
    timeout: Duration,
    clock: Mutex<ClockSync>,
}

impl NtpDriftMonitor {
    pub fn new(max_drift_ms: i64) -> Self {
        Self::with_server(DEFAULT_NTP_SERVER, NTP_TIMEOUT, max_drift_ms)
    }

    pub fn with_server(server: impl Into<String>, timeout: Duration, max_drift_ms: i64) -> Self {
        Self {
            server: server.into(),
            timeout,
            clock: Mutex::new(ClockSync::new(max_drift_ms)),
        }
    }

    /// Snapshot of the running estimate.
    pub fn clock(&self) -> ClockSync {
        self.clock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DriftMonitor for NtpDriftMonitor {
    async fn check_drift(&self) -> Result<DriftReport, NetworkError> {
        let offset_ms = query_ntp_offset(&self.server, self.timeout).await?;

        let (report, verdict) = {
            let mut clock = self
                .clock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            clock.record(offset_ms);
            let report = DriftReport {
                offset_ms,
                smoothed_ms: clock.offset_ms,
                max_drift_ms: clock.max_drift_ms,
            };
            (report, clock.check(offset_ms))
        };

        match verdict {
            Ok(()) => tracing::debug!(offset_ms, server = %self.server, "clock drift within bounds"),
            Err(e) => tracing::warn!(
                error = %e,
                server = %self.server,
                "system clock drifts from network time, check the NTP configuration"
            ),
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock_sync::encode_reply;
    use tokio::net::UdpSocket;
    use vigil_types::Timestamp;

    async fn one_shot_server(skew_ms: i64) -> String {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let mut buf = [0u8; 48];
            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            let now = Timestamp::now().as_millis() as i64;
            let reply = encode_reply(Timestamp::from_millis((now + skew_ms) as u64));
            server.send_to(&reply, peer).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn large_skew_is_reported() {
        let addr = one_shot_server(60_000).await;
        let monitor = NtpDriftMonitor::with_server(addr, Duration::from_secs(2), 10_000);
        let report = monitor.check_drift().await.unwrap();
        assert!(matches!(
            monitor.clock().check(report.offset_ms),
            Err(NetworkError::ClockDrift { max_ms: 10_000, .. })
        ));
        assert_eq!(monitor.clock().sync_count, 1);
        assert_eq!(report.smoothed_ms, report.offset_ms);
    }

    #[tokio::test]
    async fn small_skew_is_within_limit() {
        let addr = one_shot_server(0).await;
        let monitor = NtpDriftMonitor::with_server(addr, Duration::from_secs(2), 10_000);
        let report = monitor.check_drift().await.unwrap();
        assert!(monitor.clock().check(report.offset_ms).is_ok());
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap().to_string();
        let monitor = NtpDriftMonitor::with_server(addr, Duration::from_millis(50), 10_000);
        assert!(monitor.check_drift().await.is_err());
        assert_eq!(monitor.clock().sync_count, 0);
    }
}
