use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("NTP query failed: {0}")]
    NtpQuery(String),

    #[error("NTP query timed out after {0:?}")]
    NtpTimeout(std::time::Duration),

    #[error("malformed NTP response: {0}")]
    NtpResponse(String),

    #[error("clock drift too large: {drift_ms}ms (max {max_ms}ms)")]
    ClockDrift { drift_ms: i64, max_ms: i64 },
}
