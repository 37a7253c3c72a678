//! Account address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VigilError;

/// A 20-byte account address, the low 20 bytes of the Keccak-256 hash of an
/// uncompressed secp256k1 public key.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice, failing if it is not exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, VigilError> {
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| VigilError::InvalidLength { expected: 20, got: bytes.len() })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim_start_matches("0x").trim_start_matches("0X");
        let bytes = hex::decode(raw).map_err(|e| VigilError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}
