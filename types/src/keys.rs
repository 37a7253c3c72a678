//! Key material and node identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::VigilError;

/// A packed secp256k1 public key: the X and Y coordinates as two 32-byte
/// big-endian integers, without the SEC1 `0x04` prefix.
///
/// This is the identifier the registry stores for every masternode. Nothing
/// about the type guarantees the point is on the curve; `vigil-crypto`
/// performs that check.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub [u8; 64]);

impl NodeId {
    pub const LEN: usize = 64;

    /// Join the two 32-byte halves stored by the registry.
    pub fn from_halves(x: [u8; 32], y: [u8; 32]) -> Self {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&x);
        out[32..].copy_from_slice(&y);
        Self(out)
    }

    pub fn x(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn y(&self) -> &[u8] {
        &self.0[32..]
    }

    /// The 8-byte prefix the registry keys its linked list by.
    pub fn short_id(&self) -> ShortId {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.0[..8]);
        ShortId(out)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}..)", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The first 8 bytes of a [`NodeId`]. Used as the registry key and as the
/// masternode's printable id (16 lowercase hex characters).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShortId(pub [u8; 8]);

impl ShortId {
    /// End-of-list marker in the registry's linked list.
    pub const ZERO: Self = Self([0u8; 8]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 8]
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Lowercase hex form, the canonical textual masternode id.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortId({})", self.to_hex())
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ShortId {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| VigilError::InvalidHex(e.to_string()))?;
        let arr: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| VigilError::InvalidLength { expected: 8, got: bytes.len() })?;
        Ok(Self(arr))
    }
}

/// A 32-byte secp256k1 secret key.
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A 65-byte recoverable ECDSA signature laid out as `[R || S || V]`, where
/// `V` is the recovery bit (0 or 1).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 65]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn recovery_id(&self) -> u8 {
        self.0[64]
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", hex::encode(self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SigVisitor;

        impl<'de> serde::de::Visitor<'de> for SigVisitor {
            type Value = Signature;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "65 bytes")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                let arr: [u8; 65] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(Signature(arr))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                let mut arr = [0u8; 65];
                for (i, byte) in arr.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Signature(arr))
            }
        }

        deserializer.deserialize_bytes(SigVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_is_prefix_of_node_id() {
        let mut raw = [0u8; 64];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = i as u8;
        }
        let id = NodeId(raw);
        assert_eq!(id.short_id().0, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(id.short_id().to_hex(), "0001020304050607");
    }

    #[test]
    fn halves_join_in_order() {
        let id = NodeId::from_halves([0xaa; 32], [0xbb; 32]);
        assert_eq!(id.x(), &[0xaa; 32][..]);
        assert_eq!(id.y(), &[0xbb; 32][..]);
    }

    #[test]
    fn short_id_parses_hex() {
        let id: ShortId = "00000000000000ff".parse().unwrap();
        assert_eq!(id.0[7], 0xff);
        assert!("00ff".parse::<ShortId>().is_err());
        assert!("zz".parse::<ShortId>().is_err());
    }

    #[test]
    fn zero_short_id() {
        assert!(ShortId::ZERO.is_zero());
        assert!(!ShortId([0, 0, 0, 0, 0, 0, 0, 1]).is_zero());
    }

    #[test]
    fn signature_parts() {
        let mut raw = [0u8; 65];
        raw[0] = 1;
        raw[32] = 2;
        raw[64] = 1;
        let sig = Signature(raw);
        assert_eq!(sig.r()[0], 1);
        assert_eq!(sig.s()[0], 2);
        assert_eq!(sig.recovery_id(), 1);
    }
}
