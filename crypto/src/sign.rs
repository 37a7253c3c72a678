//! Recoverable ECDSA signing over 32-byte hashes.

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use vigil_types::{NodeId, PrivateKey, Signature};

use crate::error::CryptoError;
use crate::keys::{node_id_from_public, secret_key};

fn message(hash: &[u8]) -> Result<Message, CryptoError> {
    Message::from_digest_slice(hash).map_err(|_| CryptoError::InvalidHashLength(hash.len()))
}

/// Sign a 32-byte hash, producing `[R || S || V]` with `V` in {0, 1}.
///
/// Signing is deterministic (RFC 6979): the same key and hash always yield the
/// same signature.
pub fn sign_hash(hash: &[u8], private: &PrivateKey) -> Result<Signature, CryptoError> {
    let msg = message(hash)?;
    let sk = secret_key(private)?;
    let secp = Secp256k1::new();
    let (rec_id, compact) = secp.sign_ecdsa_recoverable(&msg, &sk).serialize_compact();
    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&compact);
    out[64] = rec_id.to_i32() as u8;
    Ok(Signature(out))
}

/// Recover the packed public key that produced `signature` over `hash`.
pub fn recover_public_key(hash: &[u8], signature: &Signature) -> Result<NodeId, CryptoError> {
    let msg = message(hash)?;
    let rec_id = RecoveryId::from_i32(signature.recovery_id() as i32)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let sig = RecoverableSignature::from_compact(&signature.as_bytes()[..64], rec_id)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let secp = Secp256k1::new();
    let public = secp
        .recover_ecdsa(&msg, &sig)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(node_id_from_public(&public))
}

/// Whether `signature` over `hash` was produced by the key behind `signer`.
pub fn verify_hash_signature(hash: &[u8], signature: &Signature, signer: &NodeId) -> bool {
    recover_public_key(hash, signature)
        .map(|recovered| &recovered == signer)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::keccak256;
    use crate::keys::node_id_from_private;

    #[test]
    fn sign_and_recover() {
        let key = PrivateKey([5u8; 32]);
        let hash = keccak256(b"liveness");
        let sig = sign_hash(&hash, &key).unwrap();
        let signer = node_id_from_private(&key).unwrap();
        assert_eq!(recover_public_key(&hash, &sig).unwrap(), signer);
        assert!(verify_hash_signature(&hash, &sig, &signer));
    }

    #[test]
    fn recovery_bit_is_zero_or_one() {
        let key = PrivateKey([9u8; 32]);
        for i in 0u8..16 {
            let sig = sign_hash(&keccak256(&[i]), &key).unwrap();
            assert!(sig.recovery_id() <= 1);
        }
    }

    #[test]
    fn signature_deterministic() {
        let key = PrivateKey([3u8; 32]);
        let hash = keccak256(b"deterministic test");
        assert_eq!(sign_hash(&hash, &key).unwrap(), sign_hash(&hash, &key).unwrap());
    }

    #[test]
    fn wrong_hash_does_not_verify() {
        let key = PrivateKey([5u8; 32]);
        let signer = node_id_from_private(&key).unwrap();
        let sig = sign_hash(&keccak256(b"correct"), &key).unwrap();
        assert!(!verify_hash_signature(&keccak256(b"wrong"), &sig, &signer));
    }

    #[test]
    fn wrong_key_does_not_verify() {
        let hash = keccak256(b"test");
        let sig = sign_hash(&hash, &PrivateKey([1u8; 32])).unwrap();
        let other = node_id_from_private(&PrivateKey([2u8; 32])).unwrap();
        assert!(!verify_hash_signature(&hash, &sig, &other));
    }

    #[test]
    fn short_hash_rejected() {
        let err = sign_hash(&[0u8; 20], &PrivateKey([1u8; 32])).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidHashLength(20)));
    }

    #[test]
    fn bad_recovery_bit_rejected() {
        let hash = keccak256(b"x");
        let mut sig = sign_hash(&hash, &PrivateKey([1u8; 32])).unwrap();
        sig.0[64] = 7;
        assert!(recover_public_key(&hash, &sig).is_err());
    }
}
