//! Clock synchronization against an NTP server.
//!
//! A minimal SNTPv4 client (RFC 4330): one 48-byte request, the server's
//! transmit timestamp compared with the midpoint of the local send and
//! receive times.

use std::time::Duration;

use tokio::net::UdpSocket;
use vigil_types::Timestamp;

use crate::NetworkError;

/// Default public server pool.
pub const DEFAULT_NTP_SERVER: &str = "pool.ntp.org:123";

/// Reply deadline for one query.
pub const NTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_EPOCH_OFFSET: u64 = 2_208_988_800;

const SNTP_PACKET_LEN: usize = 48;

/// Running estimate of the local clock's offset from network time.
#[derive(Clone, Debug)]
pub struct ClockSync {
    /// Maximum acceptable drift in milliseconds.
    pub max_drift_ms: i64,
    /// Smoothed offset (network minus local) in milliseconds.
    pub offset_ms: i64,
    /// When the last offset was recorded.
    pub last_sync: Timestamp,
    pub sync_count: u32,
}

impl ClockSync {
    pub fn new(max_drift_ms: i64) -> Self {
        Self {
            max_drift_ms,
            offset_ms: 0,
            last_sync: Timestamp::EPOCH,
            sync_count: 0,
        }
    }

    /// Fold a fresh observation into the estimate.
    ///
    /// The first observation is adopted as is; later ones are blended with
    /// weight 1/8 so a single bad reply cannot swing the estimate.
    pub fn record(&mut self, offset_ms: i64) {
        if self.sync_count == 0 {
            self.offset_ms = offset_ms;
        } else {
            self.offset_ms = (self.offset_ms * 7 + offset_ms) / 8;
        }
        self.last_sync = Timestamp::now();
        self.sync_count += 1;
    }

    /// Fails if `offset_ms` is further from zero than the allowed drift.
    pub fn check(&self, offset_ms: i64) -> Result<(), NetworkError> {
        if offset_ms.abs() > self.max_drift_ms {
            return Err(NetworkError::ClockDrift {
                drift_ms: offset_ms,
                max_ms: self.max_drift_ms,
            });
        }
        Ok(())
    }
}

/// Query `server` once and return its offset from the local clock in ms.
pub async fn query_ntp_offset(server: &str, timeout: Duration) -> Result<i64, NetworkError> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(|e| NetworkError::NtpQuery(format!("bind failed: {e}")))?;

    // LI=0, VN=4, Mode=3 (client)
    let mut request = [0u8; SNTP_PACKET_LEN];
    request[0] = 0x23;

    let sent_at = Timestamp::now();
    socket
        .send_to(&request, server)
        .await
        .map_err(|e| NetworkError::NtpQuery(format!("send to {server} failed: {e}")))?;

    let mut response = [0u8; SNTP_PACKET_LEN];
    let received = match tokio::time::timeout(timeout, socket.recv_from(&mut response)).await {
        Ok(Ok((n, _addr))) => n,
        Ok(Err(e)) => return Err(NetworkError::NtpQuery(format!("recv failed: {e}"))),
        Err(_elapsed) => return Err(NetworkError::NtpTimeout(timeout)),
    };
    let received_at = Timestamp::now();

    let server_time = parse_transmit_time(&response[..received])?;
    Ok(server_time.offset_from(Timestamp::midpoint(sent_at, received_at)))
}

/// Extract the transmit timestamp (bytes 40..48) of an SNTP reply.
pub fn parse_transmit_time(response: &[u8]) -> Result<Timestamp, NetworkError> {
    if response.len() < SNTP_PACKET_LEN {
        return Err(NetworkError::NtpResponse(format!(
            "{} bytes, expected {SNTP_PACKET_LEN}",
            response.len()
        )));
    }
    let secs = u32::from_be_bytes([response[40], response[41], response[42], response[43]]) as u64;
    let fraction =
        u32::from_be_bytes([response[44], response[45], response[46], response[47]]) as u64;
    if secs < NTP_EPOCH_OFFSET {
        return Err(NetworkError::NtpResponse(format!(
            "transmit time {secs} precedes the Unix epoch"
        )));
    }
    let millis = (secs - NTP_EPOCH_OFFSET) * 1000 + ((fraction * 1000) >> 32);
    Ok(Timestamp::from_millis(millis))
}

/// Encode `ts` as an SNTP server reply. Used by test servers.
pub fn encode_reply(ts: Timestamp) -> [u8; SNTP_PACKET_LEN] {
    let mut reply = [0u8; SNTP_PACKET_LEN];
    // LI=0, VN=4, Mode=4 (server)
    reply[0] = 0x24;
    let secs = (ts.as_secs() + NTP_EPOCH_OFFSET) as u32;
    let fraction = (((ts.as_millis() % 1000) << 32) / 1000) as u32;
    reply[40..44].copy_from_slice(&secs.to_be_bytes());
    reply[44..48].copy_from_slice(&fraction.to_be_bytes());
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmit_time_round_trips_through_reply() {
        let ts = Timestamp::from_millis(1_700_000_000_250);
        let parsed = parse_transmit_time(&encode_reply(ts)).unwrap();
        // the fraction is truncated, so allow one millisecond
        assert!(parsed.offset_from(ts).abs() <= 1);
    }

    #[test]
    fn short_reply_is_rejected() {
        let err = parse_transmit_time(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, NetworkError::NtpResponse(_)));
    }

    #[test]
    fn pre_epoch_reply_is_rejected() {
        let err = parse_transmit_time(&[0u8; 48]).unwrap_err();
        assert!(matches!(err, NetworkError::NtpResponse(_)));
    }

    #[test]
    fn first_observation_is_adopted() {
        let mut sync = ClockSync::new(5_000);
        sync.record(1_600);
        assert_eq!(sync.offset_ms, 1_600);
        assert_eq!(sync.sync_count, 1);
        assert!(sync.last_sync > Timestamp::EPOCH);
    }

    #[test]
    fn later_observations_are_smoothed() {
        let mut sync = ClockSync::new(5_000);
        sync.record(0);
        sync.record(800);
        assert_eq!(sync.offset_ms, 100);
    }

    #[test]
    fn smoothing_converges() {
        let mut sync = ClockSync::new(60_000);
        sync.record(0);
        for _ in 0..40 {
            sync.record(3_000);
        }
        assert!(sync.offset_ms > 2_900 && sync.offset_ms <= 3_000, "{}", sync.offset_ms);
    }

    #[test]
    fn drift_boundary_is_inclusive() {
        let sync = ClockSync::new(10_000);
        assert!(sync.check(10_000).is_ok());
        assert!(sync.check(-10_000).is_ok());
        match sync.check(-10_001) {
            Err(NetworkError::ClockDrift { drift_ms, max_ms }) => {
                assert_eq!(drift_ms, -10_001);
                assert_eq!(max_ms, 10_000);
            }
            other => panic!("expected ClockDrift, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn queries_a_local_server() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let mut buf = [0u8; 48];
            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            let ahead = Timestamp::from_millis(Timestamp::now().as_millis() + 30_000);
            server.send_to(&encode_reply(ahead), peer).await.unwrap();
        });

        let offset = query_ntp_offset(&addr, Duration::from_secs(2)).await.unwrap();
        assert!((29_000..=31_000).contains(&offset), "offset {offset}");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        let err = query_ntp_offset(&addr, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::NtpTimeout(_)));
        drop(server);
    }
}
