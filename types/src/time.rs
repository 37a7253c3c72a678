//! Wall-clock timestamps, used by the clock-drift check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Current system time. A clock set before the epoch reads as the epoch.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(millis as u64)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs(&self) -> u64 {
        self.0 / 1000
    }

    /// Signed difference `self - other` in milliseconds.
    pub fn offset_from(&self, other: Timestamp) -> i64 {
        self.0 as i64 - other.0 as i64
    }

    /// Midpoint between two readings, used to centre a round trip.
    pub fn midpoint(a: Timestamp, b: Timestamp) -> Timestamp {
        Timestamp(a.0 / 2 + b.0 / 2 + (a.0 % 2 + b.0 % 2) / 2)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_signed() {
        let a = Timestamp::from_secs(10);
        let b = Timestamp::from_millis(12_500);
        assert_eq!(b.offset_from(a), 2_500);
        assert_eq!(a.offset_from(b), -2_500);
    }

    #[test]
    fn midpoint_of_round_trip() {
        let mid = Timestamp::midpoint(Timestamp::from_millis(1_000), Timestamp::from_millis(1_301));
        assert_eq!(mid.as_millis(), 1_150);
    }
}
