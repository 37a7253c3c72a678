//! Account address derivation from public keys.
//!
//! An address is the last 20 bytes of Keccak-256 over the 64-byte packed
//! public key (the uncompressed SEC1 encoding without its tag byte).

use vigil_types::{Address, NodeId, PrivateKey};

use crate::error::CryptoError;
use crate::hash::keccak256;
use crate::keys::node_id_from_private;

/// Derive the account address controlled by a packed public key.
pub fn address_from_node_id(id: &NodeId) -> Address {
    let digest = keccak256(id.as_bytes());
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::new(out)
}

/// Derive the account address controlled by a private key.
pub fn address_from_private(private: &PrivateKey) -> Result<Address, CryptoError> {
    Ok(address_from_node_id(&node_id_from_private(private)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_one_has_known_address() {
        let mut raw = [0u8; 32];
        raw[31] = 1;
        let addr = address_from_private(&PrivateKey(raw)).unwrap();
        assert_eq!(addr.to_string(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn distinct_keys_distinct_addresses() {
        let a = address_from_private(&PrivateKey([1u8; 32])).unwrap();
        let b = address_from_private(&PrivateKey([2u8; 32])).unwrap();
        assert_ne!(a, b);
    }
}
