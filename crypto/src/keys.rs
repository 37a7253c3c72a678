//! secp256k1 key handling and packed-identifier validation.

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use vigil_types::{NodeId, PrivateKey};

use crate::error::CryptoError;

/// SEC1 tag for an uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Parse a private key, rejecting zero and values at or above the curve order.
pub fn secret_key(private: &PrivateKey) -> Result<SecretKey, CryptoError> {
    SecretKey::from_slice(private.as_bytes()).map_err(|_| CryptoError::InvalidPrivateKey)
}

/// Pack a public key as its 64-byte X‖Y form.
pub fn node_id_from_public(public: &PublicKey) -> NodeId {
    let uncompressed = public.serialize_uncompressed();
    let mut out = [0u8; 64];
    out.copy_from_slice(&uncompressed[1..]);
    NodeId(out)
}

/// Derive the packed identifier of the key pair owning `private`.
pub fn node_id_from_private(private: &PrivateKey) -> Result<NodeId, CryptoError> {
    let secp = Secp256k1::new();
    let sk = secret_key(private)?;
    Ok(node_id_from_public(&PublicKey::from_secret_key(&secp, &sk)))
}

/// Decode a packed identifier into a curve point.
///
/// Returns `None` when (X, Y) does not satisfy the curve equation or a
/// coordinate is not a field element.
pub fn public_key_from_node_id(id: &NodeId) -> Option<PublicKey> {
    let mut sec1 = [0u8; 65];
    sec1[0] = UNCOMPRESSED_TAG;
    sec1[1..].copy_from_slice(id.as_bytes());
    PublicKey::from_slice(&sec1).ok()
}

/// Whether the packed identifier is a point on secp256k1.
pub fn is_on_curve(id: &NodeId) -> bool {
    public_key_from_node_id(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_one() -> PrivateKey {
        let mut raw = [0u8; 32];
        raw[31] = 1;
        PrivateKey(raw)
    }

    #[test]
    fn private_key_one_is_generator() {
        let id = node_id_from_private(&key_one()).unwrap();
        assert_eq!(
            hex::encode(id.x()),
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            hex::encode(id.y()),
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn derived_id_is_on_curve() {
        let id = node_id_from_private(&PrivateKey([7u8; 32])).unwrap();
        assert!(is_on_curve(&id));
        let pk = public_key_from_node_id(&id).unwrap();
        assert_eq!(node_id_from_public(&pk), id);
    }

    #[test]
    fn tampered_id_is_off_curve() {
        let mut id = node_id_from_private(&PrivateKey([7u8; 32])).unwrap();
        id.0[63] ^= 0x01;
        assert!(!is_on_curve(&id));
    }

    #[test]
    fn all_zero_id_is_off_curve() {
        assert!(!is_on_curve(&NodeId([0u8; 64])));
    }

    #[test]
    fn zero_private_key_rejected() {
        assert!(matches!(
            node_id_from_private(&PrivateKey([0u8; 32])),
            Err(CryptoError::InvalidPrivateKey)
        ));
    }
}
