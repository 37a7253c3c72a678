//! Network-time checks for the masternode layer.
//!
//! A masternode that pings with a badly skewed clock is still accepted by the
//! registry, but its peers will see its messages at odd times. The heartbeat
//! loop therefore periodically compares the local clock with an NTP server
//! and warns when the two have drifted apart.

pub mod clock_sync;
pub mod drift;
pub mod error;

pub use clock_sync::ClockSync;
pub use drift::{DriftMonitor, DriftReport, NtpDriftMonitor};
pub use error::NetworkError;
